//! # Messages
//!
//! Constant strings and format functions for the command menus and prompts.

pub const BACK_TO_MENU: &str = "<< Back to menu";

// Echo
pub const ECHO_MENU: &str = "Echo command - Pick an option:";
pub const ECHO_PROMPT: &str = "What do you want me to echo?";
pub const ECHO_OPTION: &str = "Echo";
pub const EXIT_OPTION: &str = "Exit";

// Watchlist
pub const WATCHLIST_MENU: &str = "Please choose an option";
pub const WATCHLIST_ADD_PROMPT: &str =
    "Please respond with a ticker you would like to add to the watchlist";
pub const WATCHLIST_REMOVE_PROMPT: &str =
    "Please select the ticker you would like to remove from your watchlist";
pub const WATCHLIST_VIEW: &str = "You have the following assets on your watchlist:";
pub const WATCHLIST_EMPTY: &str =
    "You have no items on your watchlist. Please add some assets to watch.";
pub const WATCHLIST_MATCHES: &str = "Found the following assets fitting the query";

pub fn watchlist_no_match(query: &str) -> String {
    format!("Could not find any asset fitting the query {query}")
}

pub fn watchlist_ticker_too_long(max: usize) -> String {
    format!("Tickers can be at most {max} characters long")
}
