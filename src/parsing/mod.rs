pub mod heading_scanner;
