use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use log::{debug, info};

use stencil_core::addrs::{Provider, ResourceAddr, parse_provider_source};
use stencil_core::diagnostics::Diagnostics;
use stencil_core::scaffold::{self, ScaffoldConfig};
use stencil_core::schema::{ProviderSchemas, SchemaSource};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Write configuration templates from provider schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a template resource block for a resource address
    Add {
        /// Resource address (e.g., aws_instance.web or data.aws_ami.ubuntu)
        address: String,

        /// File to write the template to
        #[arg(default_value = "import.tf")]
        file: PathBuf,

        /// Provider schemas, as printed by `terraform providers schema -json`
        #[arg(long, default_value = "schemas.json")]
        schemas: PathBuf,

        /// Provider source to use instead of the one implied by the resource type
        #[arg(long)]
        provider: Option<String>,

        /// Leave optional attributes out
        #[arg(long)]
        required_only: bool,

        /// Leave attribute descriptions out
        #[arg(long)]
        no_descriptions: bool,

        /// Also expand nested blocks that may be omitted
        #[arg(long)]
        include_optional_blocks: bool,

        /// Overwrite the file if it already exists
        #[arg(long, short)]
        force: bool,

        /// Print the template instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Show the fully-qualified address of a provider source string
    Provider {
        /// Provider source (name, namespace/name, or hostname/namespace/name)
        source: String,
    },
    /// Generate a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options for `stencil add`
struct AddOptions {
    address: String,
    file: PathBuf,
    schemas: PathBuf,
    provider: Option<String>,
    config: ScaffoldConfig,
    force: bool,
    stdout: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add {
            address,
            file,
            schemas,
            provider,
            required_only,
            no_descriptions,
            include_optional_blocks,
            force,
            stdout,
        } => run_add(AddOptions {
            address,
            file,
            schemas,
            provider,
            config: ScaffoldConfig {
                include_descriptions: !no_descriptions,
                include_optional: !required_only,
                include_optional_blocks,
                ..Default::default()
            },
            force,
            stdout,
        }),
        Commands::Provider { source } => run_provider(&source),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "stencil", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_add(options: AddOptions) -> Result<(), String> {
    let text = build_scaffold(&options)?;

    if options.stdout {
        print!("{}", text);
        return Ok(());
    }

    write_scaffold(&options.file, &text, options.force)?;
    println!("{} {}", "Wrote:".green(), options.file.display());
    Ok(())
}

/// Resolve the address, load schemas and render, without touching the output
/// file.
fn build_scaffold(options: &AddOptions) -> Result<String, String> {
    let addr = ResourceAddr::parse(&options.address).map_err(|e| e.to_string())?;

    let provider = check_provider(addr.resolve_provider(options.provider.as_deref()))?;
    info!("using provider {} for {}", provider, addr);

    let schemas = load_schemas(&options.schemas)?;
    if !schemas.has_provider(&provider) {
        let known: Vec<String> = schemas.providers().iter().map(|p| p.for_display()).collect();
        debug!("no schema for {}; loaded: {}", provider, known.join(", "));
    }
    scaffold::scaffold_resource(&schemas, &addr, &provider, &options.config)
        .map_err(|diag| diag.to_string())
}

fn load_schemas(path: &Path) -> Result<ProviderSchemas, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let schemas = ProviderSchemas::from_json(&content)
        .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;
    debug!(
        "loaded schemas for {} provider(s) from {}",
        schemas.len(),
        path.display()
    );
    Ok(schemas)
}

/// Write the template, refusing to replace an existing file unless `force`.
fn write_scaffold(path: &Path, text: &str, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "File {} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    fs::write(path, text).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn run_provider(source: &str) -> Result<(), String> {
    let provider = check_provider(parse_provider_source(source))?;

    println!("{}", provider.to_string().bold());
    println!("  {} {}", "hostname: ".cyan(), provider.hostname());
    println!("  {} {}", "namespace:".cyan(), provider.namespace());
    println!("  {} {}", "type:     ".cyan(), provider.type_name());
    if provider.is_builtin() {
        println!("  {}", "built-in provider".yellow());
    } else if provider.is_legacy() {
        println!("  {}", "legacy provider address".yellow());
    } else {
        println!("  {} {}", "display:  ".cyan(), provider.for_display());
    }
    Ok(())
}

/// Print any warnings and turn error diagnostics into the command's error.
fn check_provider((provider, diags): (Option<Provider>, Diagnostics)) -> Result<Provider, String> {
    let warnings = diags.into_result().map_err(|diags| diags.to_string())?;
    for diag in warnings.warnings() {
        eprintln!("{} {}", "Warning:".yellow().bold(), diag);
    }
    provider.ok_or_else(|| "No provider could be resolved".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCHEMAS: &str = r#"{
        "format_version": "1.0",
        "provider_schemas": {
            "registry.terraform.io/hashicorp/aws": {
                "resource_schemas": {
                    "aws_instance": {
                        "version": 1,
                        "block": {
                            "attributes": {
                                "ami": {"type": "string", "required": true, "description": "AMI to use"},
                                "arn": {"type": "string", "computed": true},
                                "tags": {"type": ["map", "string"], "optional": true}
                            },
                            "block_types": {
                                "ebs_block_device": {
                                    "nesting_mode": "set",
                                    "block": {
                                        "attributes": {
                                            "device_name": {"type": "string", "required": true}
                                        }
                                    },
                                    "min_items": 1
                                }
                            }
                        }
                    }
                }
            },
            "example.com/acme/aws": {
                "resource_schemas": {
                    "aws_instance": {
                        "block": {
                            "attributes": {
                                "image": {"type": "string", "required": true}
                            }
                        }
                    }
                }
            }
        }
    }"#;

    fn options(dir: &Path, address: &str) -> AddOptions {
        let schemas = dir.join("schemas.json");
        fs::write(&schemas, SCHEMAS).unwrap();
        AddOptions {
            address: address.to_string(),
            file: dir.join("import.tf"),
            schemas,
            provider: None,
            config: ScaffoldConfig::default(),
            force: false,
            stdout: false,
        }
    }

    #[test]
    fn add_writes_template() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path(), "aws_instance.web");
        run_add(opts).unwrap();

        let written = fs::read_to_string(dir.path().join("import.tf")).unwrap();
        assert_eq!(
            written,
            "resource \"aws_instance\" \"web\" {\n  \
             # AMI to use\n  \
             ami = <REQUIRED string>\n\n  \
             tags = <OPTIONAL map of string>\n\n  \
             ebs_block_device {\n    \
             device_name = <REQUIRED string>\n\n  \
             }\n\
             }\n"
        );
    }

    #[test]
    fn add_with_explicit_provider() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path(), "aws_instance.web");
        opts.provider = Some("example.com/acme/aws".to_string());
        let text = build_scaffold(&opts).unwrap();
        assert!(text.contains("image = <REQUIRED string>"));
        assert!(!text.contains("ami"));
    }

    #[test]
    fn add_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path(), "aws_instance.web");
        fs::write(&opts.file, "existing").unwrap();

        let err = run_add(opts).unwrap_err();
        assert!(err.contains("already exists"));
        let content = fs::read_to_string(dir.path().join("import.tf")).unwrap();
        assert_eq!(content, "existing");
    }

    #[test]
    fn add_overwrites_with_force() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path(), "aws_instance.web");
        fs::write(&opts.file, "existing").unwrap();
        opts.force = true;

        run_add(opts).unwrap();
        let content = fs::read_to_string(dir.path().join("import.tf")).unwrap();
        assert!(content.starts_with("resource \"aws_instance\" \"web\" {"));
    }

    #[test]
    fn add_fails_without_partial_file() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path(), "aws_nope.web");

        let err = run_add(opts).unwrap_err();
        assert!(err.contains("Missing resource schema"));
        assert!(!dir.path().join("import.tf").exists());
    }

    #[test]
    fn add_to_stdout_writes_no_file() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path(), "aws_instance.web");
        opts.stdout = true;

        run_add(opts).unwrap();
        assert!(!dir.path().join("import.tf").exists());
    }

    #[test]
    fn add_to_stdout_ignores_existing_file() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path(), "aws_instance.web");
        fs::write(&opts.file, "existing").unwrap();
        opts.stdout = true;

        run_add(opts).unwrap();
        let content = fs::read_to_string(dir.path().join("import.tf")).unwrap();
        assert_eq!(content, "existing");
    }

    #[test]
    fn legacy_provider_is_a_warning_not_an_error() {
        let provider = check_provider(parse_provider_source("-/aws")).unwrap();
        assert!(provider.is_legacy());
        assert!(run_provider("-/aws").is_ok());
    }

    #[test]
    fn add_rejects_bad_address() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path(), "not-an-address");
        let err = build_scaffold(&opts).unwrap_err();
        assert!(err.contains("not a valid resource address"));
    }

    #[test]
    fn add_rejects_bad_provider_override() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path(), "aws_instance.web");
        opts.provider = Some("a/b/c/d".to_string());
        let err = build_scaffold(&opts).unwrap_err();
        assert!(err.starts_with("Invalid provider source string"));
    }

    #[test]
    fn missing_schema_file() {
        let dir = tempdir().unwrap();
        let err = load_schemas(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.starts_with("Failed to read"));
    }

    #[test]
    fn provider_command_accepts_valid_source() {
        assert!(run_provider("hashicorp/aws").is_ok());
        assert!(run_provider("a/b/c/d").is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
