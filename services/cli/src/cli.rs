use crate::commands::{
    run_documents, run_rut, run_submit, run_validate, DocumentsArgs, SubmitArgs, ValidateArgs,
};
use admissions::error::AppError;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "admissions",
    about = "Validate and submit school admission applications from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check or format a Chilean RUT
    Rut {
        #[command(subcommand)]
        command: RutCommand,
    },
    /// Run every wizard step's validation against a draft file
    Validate(ValidateArgs),
    /// Walk a draft through the wizard and submit it with its documents
    Submit(SubmitArgs),
    /// List the documents stored for an application
    Documents(DocumentsArgs),
}

#[derive(Subcommand, Debug)]
pub(crate) enum RutCommand {
    /// Report whether the check digit matches
    Check { value: String },
    /// Apply the live-typing formatter
    Format { value: String },
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Rut { command } => {
            run_rut(command);
            Ok(())
        }
        Command::Validate(args) => run_validate(args),
        Command::Submit(args) => run_submit(args).await,
        Command::Documents(args) => run_documents(args).await,
    }
}
