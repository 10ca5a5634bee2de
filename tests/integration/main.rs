//! Integration tests for betledger

mod closing_line_test;
mod common;
mod settlement_test;
mod wager_test;
