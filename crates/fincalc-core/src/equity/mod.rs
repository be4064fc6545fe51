pub mod cost_of_capital;
pub mod ddm;
pub mod dupont;
