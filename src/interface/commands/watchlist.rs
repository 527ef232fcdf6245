//! # Watchlist Command
//!
//! Handles `/watchlist` (authenticated only). Keeps a list of tickers in scratch and lets
//! the user add (directly or through a substring search over the symbol catalog), remove
//! and view them. Every submenu offers a way back to `/watchlist`.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::message::Message;
use crate::domain::response::{ReplyOption, ReplyOptions, Response};
use crate::domain::state::{ConversationState, ScratchKey};
use crate::domain::traits::Command;
use crate::strings::messages;

pub const ID: &str = "WatchlistCommand";
pub const TRIGGER: &str = "/watchlist";

/// Tickers on the watchlist.
pub const ASSETS: ScratchKey = ScratchKey::new("watchlist-assets");
/// Message id of the add prompt while a search reply is expected.
pub const ADD_VIEW: ScratchKey = ScratchKey::new("watchlist-addview");

/// Longest ticker accepted, in bytes. Keeps `/watchlist remove <ticker>` inside
/// the 64-byte button payload limit.
pub const MAX_TICKER_LEN: usize = 32;

pub struct WatchlistCommand {
    catalog: Vec<String>,
}

impl WatchlistCommand {
    /// `catalog` is the set of symbols the search reply matches against.
    pub fn new(catalog: Vec<String>) -> Self {
        Self {
            catalog: catalog.into_iter().map(|s| s.to_uppercase()).collect(),
        }
    }

    fn search(&self, query: &str) -> Vec<&str> {
        let query = query.trim().to_uppercase();
        self.catalog
            .iter()
            .filter(|symbol| symbol.contains(&query))
            .map(String::as_str)
            .collect()
    }
}

fn command(args: &str) -> String {
    format!("{TRIGGER} {args}")
}

fn back_option() -> ReplyOption {
    ReplyOption::new(messages::BACK_TO_MENU, TRIGGER)
}

fn main_menu() -> Response {
    let options = ReplyOptions::new()
        .row(vec![
            ReplyOption::new("Add", command("add")),
            ReplyOption::new("Remove", command("remove")),
        ])
        .option(ReplyOption::new("View / Manage", command("view")))
        .option(ReplyOption::new("Exit", command("exit")));
    Response::text(messages::WATCHLIST_MENU).with_options(options)
}

fn add_asset(state: &mut ConversationState, asset: &str) {
    let mut assets = state.scratch.list(ASSETS);
    if !assets.iter().any(|a| a == asset) {
        assets.push(asset.to_string());
    }
    state.scratch.set(ASSETS, assets);
}

fn remove_asset(state: &mut ConversationState, asset: &str) {
    let mut assets = state.scratch.list(ASSETS);
    assets.retain(|a| a != asset);
    state.scratch.set(ASSETS, assets);
}

/// One option per asset, each submitting `/watchlist <action> <asset>`.
fn asset_options(assets: &[String], action: &str) -> ReplyOptions {
    assets
        .iter()
        .map(|asset| ReplyOption::new(asset.to_uppercase(), command(&format!("{action} {asset}"))))
        .collect()
}

#[async_trait]
impl Command for WatchlistCommand {
    fn id(&self) -> &str {
        ID
    }

    fn trigger(&self) -> &str {
        TRIGGER
    }

    fn description(&self) -> &str {
        "Manage your stock watchlist"
    }

    fn requires_authentication(&self) -> bool {
        true
    }

    async fn handle_invocation(
        &self,
        state: &mut ConversationState,
        message: &Message,
    ) -> Result<Option<Response>> {
        let Some(action) = message.argument(0) else {
            state.scratch.remove(ADD_VIEW);
            // Pressed "back" on one of our menus: redraw in place. Typed: replace the command.
            let menu = if message.is_callback() {
                main_menu().updating(&message.id)
            } else {
                main_menu().deleting(&message.id)
            };
            return Ok(Some(menu));
        };
        let value = message.argument(1);

        let response = match (action.to_lowercase().as_str(), value) {
            ("add", Some(asset)) if asset.len() > MAX_TICKER_LEN => Some(
                Response::text(messages::watchlist_ticker_too_long(MAX_TICKER_LEN))
                    .updating(&message.id)
                    .with_options(ReplyOptions::new().option(back_option())),
            ),
            ("add", Some(asset)) => {
                state.scratch.remove(ADD_VIEW);
                add_asset(state, asset);
                Some(main_menu().updating(&message.id))
            }
            ("add", None) => {
                state.scratch.set(ADD_VIEW, message.id.as_str());
                state.expect_reply(ID);
                Some(
                    Response::text(messages::WATCHLIST_ADD_PROMPT)
                        .updating(&message.id)
                        .with_options(ReplyOptions::new().option(back_option())),
                )
            }
            ("remove", Some(asset)) => {
                remove_asset(state, asset);
                Some(main_menu().updating(&message.id))
            }
            ("remove", None) => {
                let mut options = asset_options(&state.scratch.list(ASSETS), "remove");
                options.push(back_option());
                Some(
                    Response::text(messages::WATCHLIST_REMOVE_PROMPT)
                        .updating(&message.id)
                        .with_options(options),
                )
            }
            ("view", _) => {
                let assets = state.scratch.list(ASSETS);
                let text = if assets.is_empty() {
                    messages::WATCHLIST_EMPTY
                } else {
                    messages::WATCHLIST_VIEW
                };
                let mut options = asset_options(&assets, "view");
                options.push(back_option());
                Some(
                    Response::text(text)
                        .updating(&message.id)
                        .with_options(options),
                )
            }
            ("exit", _) => {
                state.scratch.remove(ADD_VIEW);
                Some(Response::delete(&message.id))
            }
            _ => None,
        };

        Ok(response)
    }

    async fn handle_reply(
        &self,
        state: &mut ConversationState,
        reply: &Message,
    ) -> Result<Option<Response>> {
        let Some(prompt) = state.scratch.text(ADD_VIEW).map(str::to_string) else {
            state.clear_pending_reply();
            return Ok(Some(main_menu().deleting(&reply.id)));
        };

        // The prompt stays open so the user can refine the query.
        let matches = self.search(&reply.text);
        let text = if matches.is_empty() {
            messages::watchlist_no_match(reply.text.trim())
        } else {
            messages::WATCHLIST_MATCHES.to_string()
        };

        let mut options: ReplyOptions = matches
            .iter()
            .map(|symbol| ReplyOption::new(*symbol, command(&format!("add {symbol}"))))
            .collect();
        options.push(back_option());

        Ok(Some(
            Response::text(text).updating(prompt).with_options(options),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::WatchlistConfig;
    use crate::domain::message::MessageOrigin;

    fn watchlist() -> WatchlistCommand {
        WatchlistCommand::new(WatchlistConfig::default().catalog)
    }

    fn state() -> ConversationState {
        let mut state = ConversationState::new("100");
        state.alias = "bob".into();
        state.is_authenticated = true;
        state
    }

    async fn invoke(state: &mut ConversationState, id: &str, text: &str) -> Option<Response> {
        watchlist()
            .handle_invocation(state, &Message::new(id, text))
            .await
            .unwrap()
    }

    fn commands(response: &Response) -> Vec<String> {
        response.options.iter().map(|o| o.command.clone()).collect()
    }

    #[tokio::test]
    async fn test_add_with_value_updates_menu() {
        let mut state = state();
        let response = invoke(&mut state, "11", "/watchlist add NHY").await.unwrap();

        assert_eq!(state.scratch.list(ASSETS), vec!["NHY"]);
        assert_eq!(response.update_target.as_deref(), Some("11"));
        assert_eq!(response.text, messages::WATCHLIST_MENU);
        assert_eq!(response.options.rows()[0].len(), 2);
        assert_eq!(
            commands(&response),
            vec!["/watchlist add", "/watchlist remove", "/watchlist view", "/watchlist exit"]
        );
    }

    #[tokio::test]
    async fn test_add_is_deduplicated() {
        let mut state = state();
        invoke(&mut state, "11", "/watchlist add NHY").await;
        invoke(&mut state, "11", "/watchlist add NHY").await;
        invoke(&mut state, "11", "/watchlist add MOWI").await;
        assert_eq!(state.scratch.list(ASSETS), vec!["NHY", "MOWI"]);
    }

    #[tokio::test]
    async fn test_remove_missing_is_a_no_op() {
        let mut state = state();
        invoke(&mut state, "11", "/watchlist add NHY").await;

        let response = invoke(&mut state, "11", "/watchlist remove GSF").await.unwrap();
        assert_eq!(state.scratch.list(ASSETS), vec!["NHY"]);
        assert_eq!(response.text, messages::WATCHLIST_MENU);

        invoke(&mut state, "11", "/watchlist remove NHY").await;
        assert!(state.scratch.list(ASSETS).is_empty());
    }

    #[tokio::test]
    async fn test_remove_without_value_lists_entries() {
        let mut state = state();
        invoke(&mut state, "11", "/watchlist add nhy").await;
        let response = invoke(&mut state, "11", "/watchlist remove").await.unwrap();

        assert_eq!(response.text, messages::WATCHLIST_REMOVE_PROMPT);
        assert_eq!(commands(&response), vec!["/watchlist remove nhy", "/watchlist"]);
        assert_eq!(response.options.iter().next().unwrap().label, "NHY");
    }

    #[tokio::test]
    async fn test_view_lists_or_reports_empty() {
        let mut state = state();
        let response = invoke(&mut state, "11", "/watchlist view").await.unwrap();
        assert_eq!(response.text, messages::WATCHLIST_EMPTY);
        assert_eq!(commands(&response), vec!["/watchlist"]);

        invoke(&mut state, "11", "/watchlist add KOA").await;
        let response = invoke(&mut state, "11", "/watchlist view").await.unwrap();
        assert_eq!(response.text, messages::WATCHLIST_VIEW);
        assert_eq!(commands(&response), vec!["/watchlist view KOA", "/watchlist"]);
        assert_eq!(state.scratch.list(ASSETS), vec!["KOA"]);
    }

    #[tokio::test]
    async fn test_top_level_menu_depends_on_origin() {
        let mut state = state();
        let typed = invoke(&mut state, "11", "/watchlist").await.unwrap();
        assert_eq!(typed.delete_target.as_deref(), Some("11"));
        assert_eq!(typed.update_target, None);

        let pressed = watchlist()
            .handle_invocation(
                &mut state,
                &Message::new("12", "/watchlist").with_origin(MessageOrigin::Callback),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pressed.update_target.as_deref(), Some("12"));
        assert_eq!(pressed.delete_target, None);
    }

    #[tokio::test]
    async fn test_exit_deletes_menu() {
        let mut state = state();
        let response = invoke(&mut state, "11", "/watchlist exit").await.unwrap();
        assert_eq!(response, Response::delete("11"));
    }

    #[tokio::test]
    async fn test_overlong_ticker_is_not_added() {
        let mut state = state();
        let long = "X".repeat(MAX_TICKER_LEN + 1);
        let response = invoke(&mut state, "11", &format!("/watchlist add {long}"))
            .await
            .unwrap();

        assert_eq!(response.text, messages::watchlist_ticker_too_long(MAX_TICKER_LEN));
        assert_eq!(response.update_target.as_deref(), Some("11"));
        assert!(state.scratch.list(ASSETS).is_empty());

        let fits = "X".repeat(MAX_TICKER_LEN);
        invoke(&mut state, "11", &format!("/watchlist add {fits}")).await;
        let menu = invoke(&mut state, "11", "/watchlist remove").await.unwrap();
        assert!(menu.options.iter().all(|o| o.command.len() <= 64));
    }

    #[tokio::test]
    async fn test_leaving_the_flow_drops_the_add_prompt() {
        for leave in ["/watchlist", "/watchlist exit"] {
            let mut state = state();
            invoke(&mut state, "20", "/watchlist add").await;
            assert!(state.scratch.contains(ADD_VIEW));

            invoke(&mut state, "21", leave).await;
            assert!(!state.scratch.contains(ADD_VIEW), "{leave} kept the prompt");
        }
    }

    #[tokio::test]
    async fn test_search_flow() {
        let command = watchlist();
        let mut state = state();

        let prompt = command
            .handle_invocation(&mut state, &Message::new("20", "/watchlist add"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(prompt.text, messages::WATCHLIST_ADD_PROMPT);
        assert_eq!(state.pending_reply(), Some(ID));
        assert_eq!(state.scratch.text(ADD_VIEW), Some("20"));

        let results = command
            .handle_reply(&mut state, &Message::new("21", "fj"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(results.text, messages::WATCHLIST_MATCHES);
        assert_eq!(results.update_target.as_deref(), Some("20"));
        assert_eq!(
            commands(&results),
            vec!["/watchlist add FJELL", "/watchlist add FJORD", "/watchlist"]
        );
        assert_eq!(state.pending_reply(), Some(ID));

        let none = command
            .handle_reply(&mut state, &Message::new("22", "zzz"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(none.text, messages::watchlist_no_match("zzz"));
        assert_eq!(commands(&none), vec!["/watchlist"]);

        command
            .handle_invocation(&mut state, &Message::new("20", "/watchlist add FJORD"))
            .await
            .unwrap();
        assert!(!state.scratch.contains(ADD_VIEW));
        assert_eq!(state.scratch.list(ASSETS), vec!["FJORD"]);
    }

    #[tokio::test]
    async fn test_reply_without_prompt_shows_menu() {
        let mut state = state();
        state.expect_reply(ID);
        let response = watchlist()
            .handle_reply(&mut state, &Message::new("30", "anything"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.text, messages::WATCHLIST_MENU);
        assert_eq!(response.delete_target.as_deref(), Some("30"));
        assert_eq!(state.pending_reply(), None);
    }
}
