use clap::Args;

use super::Context;
use loanapp::connectivity::Connectivity;
use loanapp::models::LoanInput;
use loanapp::submit::{submit_loan, Submission};

/// Apply for a loan
#[derive(Args)]
pub struct ApplyCommand {
    /// Loan amount
    #[arg(long, short)]
    amount: f64,

    /// What the loan is for
    #[arg(long, short)]
    purpose: String,
}

impl ApplyCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let input = LoanInput::new(self.amount, self.purpose.trim());
        let connectivity = ctx.connectivity().await;
        let session = match connectivity {
            Connectivity::Online => Some(ctx.session().await?),
            Connectivity::Offline => None,
        };

        let submission = submit_loan(
            &input,
            connectivity,
            session.as_ref(),
            &ctx.cache,
            ctx.remote.as_ref(),
        )
        .await?;

        match submission {
            Submission::Submitted { id } => {
                println!("Loan application submitted! ({})", id);
            }
            Submission::SavedOffline => {
                println!("Loan saved offline and will sync when online.");
            }
        }

        Ok(())
    }
}
