// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Health, Me, Serve, Signin, Signup, Version};

command_enum! {
    (Health, Health),
    (Me, Me),
    (Serve, Serve),
    (Signin, Signin),
    (Signup, Signup),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Build context - the API client carries the bearer token when one
    // was supplied
    let ctx = match cli::op::OpContext::new(args.remote, args.token) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
