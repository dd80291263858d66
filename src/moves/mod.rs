pub mod attacks;
pub mod execute;
pub mod pins;
pub mod tables;
