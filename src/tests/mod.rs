// Test modules for all components
pub mod test_firm;
pub mod test_run;
