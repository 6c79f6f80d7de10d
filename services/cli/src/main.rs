use admissions_cli::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("admissions error: {err}");
        std::process::exit(1);
    }
}
