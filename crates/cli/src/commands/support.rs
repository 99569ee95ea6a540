//! Support commands.

use std::collections::BTreeMap;

use clap::Subcommand;

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum SupportAction {
    /// Open a ticket; works without signing in
    Ticket {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        message: String,
    },
    /// The signed-in user's tickets
    Tickets,
    /// Support channels
    Contacts,
}

pub async fn run(ctx: &Context, action: SupportAction) -> Result<(), CliError> {
    match action {
        SupportAction::Ticket {
            name,
            email,
            subject,
            message,
        } => emit(
            &ctx.client
                .create_ticket(&name, &email, &subject, &message)
                .await?,
        ),
        SupportAction::Tickets => emit(&ctx.client.my_tickets().await?),
        SupportAction::Contacts => {
            let contacts = ctx.client.support_contacts().await?;
            let channels: BTreeMap<_, _> = contacts.channels().into_iter().collect();
            emit(&channels)
        }
    }
}
