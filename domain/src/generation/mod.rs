//! Generation subdomain: test cases, decoding and strict suite validation

pub mod parsing;
pub mod suite;
pub mod test_case;

pub use parsing::parse_test_cases;
pub use suite::TestSuite;
pub use test_case::{TestCase, TestStep};
