pub mod tokenlist;
