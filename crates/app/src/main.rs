//! Interactive shell: sign in, then navigate by typing paths.

use tokio::io::{AsyncBufReadExt, BufReader};

use hims_app::{AppState, Config, Navigation, Router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hims_observability::init();

    let config = Config::from_env()?;
    tracing::info!(api_url = %config.api_url, "starting");

    let state = AppState::new(&config);
    state.session().clone().start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_help();

    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("quit") | Some("exit") => break,
            Some("help") => print_help(),
            Some("login") => {
                let (Some(email), Some(password)) = (parts.next(), parts.next()) else {
                    println!("usage: login <email> <password>");
                    continue;
                };
                match state.session().sign_in(email, password).await {
                    Ok(()) => println!("signed in"),
                    Err(err) => println!("sign-in failed: {err}"),
                }
            }
            Some("logout") => match state.session().sign_out().await {
                Ok(()) => println!("signed out"),
                Err(err) => println!("sign-out failed: {err}"),
            },
            Some("whoami") => {
                let snapshot = state.session().snapshot();
                match (&snapshot.user, snapshot.role) {
                    (Some(user), Some(role)) => println!("{} ({role})", user.email),
                    (Some(user), None) => println!("{} (role pending)", user.email),
                    _ => println!("not signed in"),
                }
            }
            Some(path) if path.starts_with('/') => {
                let view = state.session().snapshot().view();
                match Router::resolve(path, &view) {
                    Navigation::Page(page) => println!("-> {page}"),
                    Navigation::Loading => println!("(loading)"),
                    Navigation::CheckingPermissions => println!("(checking permissions)"),
                    Navigation::RedirectToLogin { from } => {
                        println!("-> /auth (redirected from {from})")
                    }
                    Navigation::RedirectToDenied => println!("-> /unauthorized"),
                    Navigation::NotFound => println!("404"),
                }
            }
            _ => println!("unknown command; try `help`"),
        }
    }

    state.session().shutdown();
    Ok(())
}

fn print_help() {
    println!("commands: login <email> <password> | logout | whoami | quit");
    print!("routes:");
    for path in Router::paths() {
        print!(" {path}");
    }
    println!();
}
