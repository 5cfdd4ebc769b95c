//! BDD step definitions for Telegram delivery feature

use std::sync::Arc;

use cucumber::{given, then, when};

use review_notifier::config::TelegramConfig;
use review_notifier::notifier::Notifier;
use review_notifier::telegram::TelegramSender;
use review_notifier::ReviewNotifierError;

use crate::world::ReviewNotifierWorld;

#[given(expr = "a notifier for chat {string}")]
fn notifier_for_chat(world: &mut ReviewNotifierWorld, chat_id: String) {
    let config = world.config.get_or_insert_with(Default::default);
    config.telegram = TelegramConfig {
        api_base: "http://telegram.test".to_string(),
        token: "bot-token".to_string(),
        chat_id,
    };
}

#[when(expr = "the notifier sends {string}")]
async fn notifier_sends(world: &mut ReviewNotifierWorld, text: String) {
    let telegram = world
        .config
        .as_ref()
        .expect("notifier not configured")
        .telegram
        .clone();
    let sender = TelegramSender::new(&telegram, world.http());
    let notifier = Notifier::new(telegram.chat_id, Arc::new(sender));
    world.delivery_result = Some(notifier.notify(&text).await);
}

#[then("the delivery should succeed")]
fn delivery_succeeds(world: &mut ReviewNotifierWorld) {
    let result = world.delivery_result.as_ref().expect("nothing was sent");
    result.as_ref().unwrap();
}

#[then(expr = "the delivery should fail with {string}")]
fn delivery_fails(world: &mut ReviewNotifierWorld, fragment: String) {
    let result = world.delivery_result.as_ref().expect("nothing was sent");
    match result {
        Err(ReviewNotifierError::Delivery(msg)) => {
            assert!(msg.contains(&fragment), "{msg}");
        }
        other => panic!("expected a delivery error, got {other:?}"),
    }
}

#[then(expr = "Telegram should have received {string} for chat {string}")]
async fn telegram_received(world: &mut ReviewNotifierWorld, text: String, chat_id: String) {
    let posts = world.http().posts().await;
    assert_eq!(posts.len(), 1, "{:?}", posts);
    assert_eq!(posts[0]["chat_id"], chat_id.as_str());
    assert_eq!(posts[0]["text"], text.as_str());
}
