pub mod article;
pub mod demo;
pub mod financials;
pub mod lenient;
pub mod report;
