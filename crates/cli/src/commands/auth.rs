//! Account commands.

use clap::Subcommand;
use tracing::info;

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account; a verification code is emailed
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
    },
    /// Confirm a registration with the emailed code
    Verify {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        code: String,
    },
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign in with a Google session id
    Google {
        session_id: String,
    },
    /// Sign out and forget the local session
    Logout,
    /// Show the signed-in user and level progress
    Me,
}

pub async fn run(ctx: &Context, action: AuthAction) -> Result<(), CliError> {
    match action {
        AuthAction::Register {
            email,
            password,
            name,
        } => emit(&ctx.client.register(&email, &password, &name).await?),
        AuthAction::Verify { email, code } => emit(&ctx.client.verify(&email, &code).await?),
        AuthAction::Login { email, password } => {
            let user = ctx.client.login(&email, &password).await?;
            info!(name = %user.name, level = user.level, "Signed in");
            emit(&user)
        }
        AuthAction::Google { session_id } => {
            emit(&ctx.client.exchange_google_session(&session_id).await?)
        }
        AuthAction::Logout => {
            ctx.client.logout().await?;
            info!("Signed out");
            Ok(())
        }
        AuthAction::Me => {
            let user = ctx.current_user().await?;
            emit(&serde_json::json!({
                "user": user,
                "progress": user.level_progress(),
            }))
        }
    }
}
