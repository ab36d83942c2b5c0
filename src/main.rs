// sopbot - explains manufacturing sops, never approves them

use sopbot::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
