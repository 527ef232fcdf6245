//! # Command Handlers
//!
//! The commands the bot ships with (`/echo`, `/watchlist`, `/help`) and the registry
//! they are loaded into at startup.

pub mod echo;
pub mod help;
pub mod watchlist;

use crate::application::registry::CommandRegistry;
use crate::domain::config::CommandsConfig;

/// Builds the registry once per handler instantiation. `/help` goes last so its listing
/// covers everything registered before it.
pub fn default_registry(config: &CommandsConfig) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(echo::EchoCommand);
    registry.register(watchlist::WatchlistCommand::new(
        config.watchlist.catalog.clone(),
    ));

    let help = help::HelpCommand::for_registry(&registry);
    registry.register(help);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::router::{CommandRouter, Outcome};
    use crate::domain::message::Message;
    use crate::domain::state::ConversationState;
    use std::sync::Arc;

    fn router() -> CommandRouter {
        CommandRouter::new(Arc::new(default_registry(&CommandsConfig::default())))
    }

    fn state(authenticated: bool) -> ConversationState {
        let mut state = ConversationState::new("100");
        state.alias = "bob".into();
        state.display_name = "Bob".into();
        state.is_authenticated = authenticated;
        state
    }

    fn msg(id: &str, text: &str) -> Message {
        Message::new(id, text).with_sender(Some("bob".into()), Some("Bob".into()))
    }

    #[test]
    fn test_registry_contents() {
        let registry = default_registry(&CommandsConfig::default());
        let triggers: Vec<_> = registry.iter().map(|c| c.trigger().to_string()).collect();
        assert_eq!(triggers, vec!["/echo", "/watchlist", "/help"]);
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let mut state = state(false);
        let outcome = router().dispatch(&mut state, &msg("1", "/help")).await.unwrap();
        let text = &outcome.response().unwrap().text;
        assert!(text.starts_with(crate::strings::help::HEADER));
        assert!(text.contains("/echo - Echo command"));
        assert!(text.contains("/watchlist - Manage your stock watchlist (requires sign-in)"));
        assert!(text.ends_with("/help - List available commands"));
    }

    #[tokio::test]
    async fn test_unauthenticated_watchlist_is_dropped() {
        let mut state = state(false);
        let before = state.clone();
        let outcome = router().dispatch(&mut state, &msg("1", "/watchlist")).await.unwrap();
        assert_eq!(outcome, Outcome::Denied);
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_watchlist_add_scenario() {
        let mut state = state(true);
        let outcome = router()
            .dispatch(&mut state, &msg("11", "/watchlist add NHY"))
            .await
            .unwrap();
        let response = outcome.response().unwrap();

        assert_eq!(state.scratch.list(watchlist::ASSETS), vec!["NHY"]);
        assert_eq!(response.update_target.as_deref(), Some("11"));
        assert_eq!(response.text, crate::strings::messages::WATCHLIST_MENU);
    }

    #[tokio::test]
    async fn test_echo_round_trip_through_router() {
        let router = router();
        let mut state = state(false);

        let menu = router.dispatch(&mut state, &msg("5", "/echo")).await.unwrap();
        let labels: Vec<_> = menu
            .response()
            .unwrap()
            .options
            .iter()
            .map(|o| (o.label.clone(), o.command.clone()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Echo".to_string(), "/echo reply".to_string()),
                ("Exit".to_string(), "/echo exit".to_string())
            ]
        );

        router.dispatch(&mut state, &msg("42", "/echo reply")).await.unwrap();
        assert_eq!(state.pending_reply(), Some(echo::ID));

        let echoed = router.dispatch(&mut state, &msg("43", "hello")).await.unwrap();
        let response = echoed.response().unwrap();
        assert_eq!(response.text, "hello");
        assert_eq!(response.update_target.as_deref(), Some("42"));
        assert_eq!(response.options.iter().count(), 1);
        assert!(!state.scratch.contains(echo::MESSAGE_ID));

        let stray = router.dispatch(&mut state, &msg("44", "hello again")).await.unwrap();
        assert_eq!(stray, Outcome::Unroutable);
    }

    #[tokio::test]
    async fn test_pending_echo_reply_scenario() {
        let mut state = state(false);
        state.expect_reply("EchoCommand");
        state.scratch.set(echo::MESSAGE_ID, "42");

        let outcome = router().dispatch(&mut state, &msg("50", "hello")).await.unwrap();
        let response = outcome.response().unwrap();
        assert_eq!(response.update_target.as_deref(), Some("42"));
        assert_eq!(response.text, "hello");
        let options: Vec<_> = response.options.iter().collect();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, crate::strings::messages::BACK_TO_MENU);
        assert!(state.scratch.get(echo::MESSAGE_ID).is_none());
    }

    #[tokio::test]
    async fn test_prompt_abandoned_for_another_command() {
        let router = router();
        let mut state = state(true);

        router.dispatch(&mut state, &msg("20", "/watchlist add")).await.unwrap();
        assert_eq!(state.pending_reply(), Some(watchlist::ID));

        router.dispatch(&mut state, &msg("21", "/echo")).await.unwrap();
        assert_eq!(state.pending_reply(), None);

        let outcome = router.dispatch(&mut state, &msg("22", "NHY")).await.unwrap();
        assert_eq!(outcome, Outcome::Unroutable);
        assert!(state.scratch.list(watchlist::ASSETS).is_empty());
    }
}
