mod loan;
mod loan_status;
mod samples;

pub use loan::{LoanInput, LoanRecord, ValidationError};
pub use loan_status::LoanStatus;
pub use samples::{is_sample_id, sample_loans, SAMPLE_ID_PREFIX};
