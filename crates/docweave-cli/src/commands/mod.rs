pub mod audit;
pub mod run;
