mod salary;
mod stats;

pub use salary::SalaryClient;
pub use stats::StatsClient;
