// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Mustekala CLI - Browser-faithful HTTP test sessions
//!
//! Example usage and demonstration of the mustekala library.

use std::env;
use std::process::ExitCode;

use mustekala::SessionClient;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mustekala=info".parse().expect("static directive")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "get" => {
            if args.len() < 3 {
                eprintln!("Usage: mustekala get <url> [token]");
                return ExitCode::from(1);
            }
            get_url(&args[2], args.get(3).map(String::as_str)).await
        }
        "post" => {
            if args.len() < 4 {
                eprintln!("Usage: mustekala post <url> <json> [token]");
                return ExitCode::from(1);
            }
            post_json(&args[2], &args[3], args.get(4).map(String::as_str)).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("mustekala {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Mustekala - Browser-faithful HTTP test sessions

USAGE:
    mustekala <COMMAND> [OPTIONS]

COMMANDS:
    get <url> [token]          GET a URL, following redirects with session cookies
    post <url> <json> [token]  POST a JSON body and display the final response
    help                       Show this help message
    version                    Show version information

EXAMPLES:
    mustekala get http://localhost:7835/profile
    mustekala get http://localhost:7835/profile my-bearer-token
    mustekala post http://localhost:7835/api '{{"name":"value"}}'

For more information, see: https://github.com/bountyyfi/mustekala
"#
    );
}

fn make_client(url: &str, token: Option<&str>) -> Option<SessionClient> {
    let client = match SessionClient::new(url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return None;
        }
    };
    if let Some(token) = token {
        client.set_token(token);
    }
    Some(client)
}

async fn get_url(url: &str, token: Option<&str>) -> ExitCode {
    let Some(client) = make_client(url, token) else {
        return ExitCode::from(1);
    };

    match client.get(url).await {
        Ok(response) => {
            println!("Status:  {}", response.status);
            println!("URL:     {}", response.request_url());
            if let Some(cookies) = client.cookies().cookie_header(response.request_url()) {
                println!("Cookies: {}", cookies);
            }
            println!();
            println!("{}", response.text_lossy());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            ExitCode::from(1)
        }
    }
}

async fn post_json(url: &str, json: &str, token: Option<&str>) -> ExitCode {
    let Some(client) = make_client(url, token) else {
        return ExitCode::from(1);
    };

    match client.post_json(url, json).await {
        Ok(response) => {
            println!("Status: {}", response.status);
            println!();
            println!("{}", response.text_lossy());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            ExitCode::from(1)
        }
    }
}
