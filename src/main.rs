use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use sefcontext::mapping::{ContextMapping, FileTypeCode};
use sefcontext::platform::Platform;
use sefcontext::reconciler::{ContextReconciler, Outcome};
use sefcontext::relabel::HostFs;
use sefcontext::tools::{HostEnforcement, Restorecon, Semanage};

#[derive(Parser)]
#[command(name = "sefcontext", version, about = "Declarative SELinux file-context management")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a context mapping unless one already exists for the path
    Add(MappingArgs),

    /// Update an existing mapping's context type
    Modify(MappingArgs),

    /// Remove a registered mapping
    Delete(MappingArgs),

    /// Register or update, whichever the current state needs
    Apply(MappingArgs),

    /// Run a relabel pass for a path spec without touching the policy store
    Relabel {
        /// Path or regex path pattern to restore labels under
        path_spec: String,
    },
}

#[derive(Args)]
struct MappingArgs {
    /// Path or regex path pattern the mapping covers
    path_spec: String,

    /// Target context type, e.g. httpd_sys_content_t
    #[arg(short = 't', long = "type")]
    security_type: String,

    /// File type the mapping applies to (semanage letter code)
    #[arg(short = 'f', long = "ftype", default_value = "a")]
    file_type: FileTypeCode,
}

impl MappingArgs {
    fn mapping(&self) -> ContextMapping {
        ContextMapping::new(
            self.path_spec.clone(),
            self.file_type,
            self.security_type.clone(),
        )
    }
}

fn report(outcome: Outcome) {
    println!("{}", if outcome.changed() { "changed" } else { "unchanged" });
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let reconciler = ContextReconciler::new(
        Semanage,
        Restorecon,
        HostFs,
        HostEnforcement,
        Platform::detect(),
    );

    match cli.command {
        Commands::Add(args) => report(reconciler.add(&args.mapping())?),
        Commands::Modify(args) => report(reconciler.modify(&args.mapping())?),
        Commands::Delete(args) => report(reconciler.delete(&args.mapping())?),
        Commands::Apply(args) => report(reconciler.add_or_modify(&args.mapping())?),
        Commands::Relabel { path_spec } => reconciler.relabel(&path_spec)?,
    }

    Ok(())
}
