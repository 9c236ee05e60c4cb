//! Scenarios every [`Engine`](bot_config::Engine) must pass.
//!
//! Each function takes a store and uses its own bot ids, so scenarios can share
//! one database.

use bot_config::{
    BotConfig, ConfigStore, Error, PublishStatus, PublishTarget, StatusOp, Version,
};
use futures_util::future::join_all;
use serde_json::json;

pub fn config(app_id: &str, prompt: &str) -> BotConfig {
    BotConfig {
        app_id: app_id.to_owned(),
        model_config: json!({ "domain": "generalv3.5", "temperature": 0.5 }),
        regular_config: json!({ "prompt": prompt }),
        tool_ids: vec!["tool_search".to_owned()],
        flow_ids: vec!["7312".to_owned()],
        ..BotConfig::default()
    }
}

pub async fn create_draft(store: &ConfigStore) -> anyhow::Result<()> {
    let draft = store
        .create_draft_with("create_draft", config("app", "hello"))
        .await?;

    assert_eq!(draft.version, Version::Draft);
    assert!(draft.publish_status.is_empty());
    assert_eq!(draft.publish_data, None);
    assert_eq!(draft.config, config("app", "hello"));

    let err = store.create_draft("create_draft").await.unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }), "{err}");

    let versions = store.list_versions("create_draft").await?;
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0], draft);

    Ok(())
}

pub async fn publish_then_list(store: &ConfigStore) -> anyhow::Result<()> {
    let draft = store.create_draft("publish_then_list").await?;
    let published = store
        .publish_snapshot("publish_then_list", "v1.0", PublishTarget::Xingchen)
        .await?;

    assert!(published.id > draft.id);
    assert_eq!(published.bot_id, "publish_then_list");
    assert_eq!(published.publish_status.bits(), 1);

    let versions = store.list_versions("publish_then_list").await?;

    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version, Version::Draft);
    assert!(versions[0].publish_status.is_empty());
    assert_eq!(versions[1].version, Version::published("v1.0"));
    assert_eq!(versions[1].publish_status.bits(), 1);

    Ok(())
}

pub async fn publish_duplicate_version(store: &ConfigStore) -> anyhow::Result<()> {
    store.create_draft("publish_duplicate").await?;
    store
        .publish_snapshot("publish_duplicate", "v1.0", PublishTarget::Xingchen)
        .await?;

    let err = store
        .publish_snapshot("publish_duplicate", "v1.0", PublishTarget::Xingchen)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Conflict { .. }), "{err}");
    assert!(!err.is_retryable());
    assert_eq!(store.list_versions("publish_duplicate").await?.len(), 2);

    Ok(())
}

pub async fn publish_without_draft(store: &ConfigStore) -> anyhow::Result<()> {
    let err = store
        .publish_snapshot("publish_without_draft", "v1.0", PublishTarget::Aiui)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::NotFound {
            version: Version::Draft,
            ..
        }
    ));

    Ok(())
}

pub async fn snapshot_fidelity(store: &ConfigStore) -> anyhow::Result<()> {
    store
        .create_draft_with("snapshot_fidelity", config("app", "first"))
        .await?;
    store
        .publish_snapshot("snapshot_fidelity", "v1.0", PublishTarget::Kaifang)
        .await?;
    store
        .update_draft("snapshot_fidelity", config("app", "second"))
        .await?;

    let published = store.get_version("snapshot_fidelity", "v1.0").await?;

    assert_eq!(published.publish_data, Some(config("app", "first")));
    assert_eq!(published.config, config("app", "first"));

    let draft = store.get_draft("snapshot_fidelity").await?;
    assert_eq!(draft.config, config("app", "second"));
    assert_eq!(draft.publish_data, None);

    store
        .publish_snapshot("snapshot_fidelity", "v2.0", PublishTarget::Kaifang)
        .await?;

    let published = store.get_version("snapshot_fidelity", "v2.0").await?;
    assert_eq!(published.publish_data, Some(config("app", "second")));

    Ok(())
}

pub async fn concurrent_publish(store: &ConfigStore) -> anyhow::Result<()> {
    store.create_draft("concurrent_publish").await?;

    let results = join_all((0..8).map(|_| {
        store.publish_snapshot("concurrent_publish", "v1.0", PublishTarget::Xingchen)
    }))
    .await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(Error::Conflict { .. })))
        .count();

    assert_eq!(succeeded, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.list_versions("concurrent_publish").await?.len(), 2);

    Ok(())
}

pub async fn concurrent_create_draft(store: &ConfigStore) -> anyhow::Result<()> {
    let results = join_all((0..8).map(|_| store.create_draft("concurrent_draft"))).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

    let drafts = store
        .list_versions("concurrent_draft")
        .await?
        .into_iter()
        .filter(|r| r.is_draft())
        .count();

    assert_eq!(drafts, 1);

    Ok(())
}

pub async fn toggle_status(store: &ConfigStore) -> anyhow::Result<()> {
    store.create_draft("toggle_status").await?;
    let published = store
        .publish_snapshot("toggle_status", "v1.0", PublishTarget::Xingchen)
        .await?;

    let set = store
        .update_publish_status("toggle_status", "v1.0", PublishTarget::Kaifang, StatusOp::Set)
        .await?;

    assert_eq!(set.publish_status.bits(), 5);
    assert_eq!(set.publish_data, published.publish_data);

    let again = store
        .update_publish_status("toggle_status", "v1.0", PublishTarget::Kaifang, StatusOp::Set)
        .await?;
    assert_eq!(again.publish_status.bits(), 5);

    let cleared = store
        .update_publish_status(
            "toggle_status",
            "v1.0",
            PublishTarget::Kaifang,
            StatusOp::Clear,
        )
        .await?;

    assert_eq!(cleared.publish_status, published.publish_status);
    assert_eq!(cleared.publish_data, published.publish_data);
    assert_eq!(cleared.config, published.config);

    let draft = store.get_draft("toggle_status").await?;
    assert!(draft.publish_status.is_empty());

    Ok(())
}

pub async fn clear_last_target(store: &ConfigStore) -> anyhow::Result<()> {
    store.create_draft("clear_last_target").await?;
    store
        .publish_snapshot("clear_last_target", "v1.0", PublishTarget::Aiui)
        .await?;

    let cleared = store
        .update_publish_status(
            "clear_last_target",
            "v1.0",
            PublishTarget::Aiui,
            StatusOp::Clear,
        )
        .await?;

    assert_eq!(cleared.publish_status, PublishStatus::empty());
    assert_eq!(cleared.publish_data, None);
    assert!(!store.is_published("clear_last_target", "v1.0", None).await?);

    Ok(())
}

pub async fn republish_after_clear(store: &ConfigStore) -> anyhow::Result<()> {
    store
        .create_draft_with("republish_after_clear", config("app", "first"))
        .await?;
    store
        .publish_snapshot("republish_after_clear", "v1.0", PublishTarget::Aiui)
        .await?;
    store
        .update_draft("republish_after_clear", config("app", "second"))
        .await?;

    let cleared = store
        .update_publish_status(
            "republish_after_clear",
            "v1.0",
            PublishTarget::Aiui,
            StatusOp::Clear,
        )
        .await?;
    assert_eq!(cleared.publish_data, None);

    let republished = store
        .update_publish_status(
            "republish_after_clear",
            "v1.0",
            PublishTarget::Aiui,
            StatusOp::Set,
        )
        .await?;

    assert_eq!(republished.publish_status.bits(), 16);
    assert_eq!(republished.publish_data, Some(config("app", "first")));

    let draft = store
        .update_publish_status(
            "republish_after_clear",
            Version::Draft,
            PublishTarget::Kaifang,
            StatusOp::Set,
        )
        .await?;

    assert_eq!(draft.publish_status.bits(), 4);
    assert_eq!(draft.publish_data, Some(config("app", "second")));

    let again = store
        .update_publish_status(
            "republish_after_clear",
            Version::Draft,
            PublishTarget::Xingchen,
            StatusOp::Set,
        )
        .await?;

    assert_eq!(again.publish_data, Some(config("app", "second")));

    Ok(())
}

pub async fn update_status_not_found(store: &ConfigStore) -> anyhow::Result<()> {
    let err = store
        .update_publish_status(
            "update_status_not_found",
            "v9.9",
            PublishTarget::Aiui,
            StatusOp::Set,
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "{err}");

    let err = store
        .get_version("update_status_not_found", Version::Draft)
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "{err}");

    Ok(())
}

pub async fn published_queries(store: &ConfigStore) -> anyhow::Result<()> {
    store.create_draft("published_queries").await?;
    store
        .publish_snapshot("published_queries", "v1.0", PublishTarget::Xingchen)
        .await?;
    store
        .publish_snapshot("published_queries", "v2.0", PublishTarget::Kaifang)
        .await?;
    store
        .update_publish_status(
            "published_queries",
            "v2.0",
            PublishTarget::Xingchen,
            StatusOp::Set,
        )
        .await?;

    let xingchen = store
        .list_published("published_queries", PublishTarget::Xingchen)
        .await?
        .into_iter()
        .map(|r| r.version)
        .collect::<Vec<_>>();

    assert_eq!(
        xingchen,
        vec![Version::published("v1.0"), Version::published("v2.0")]
    );
    assert!(store
        .list_published("published_queries", PublishTarget::Aiui)
        .await?
        .is_empty());

    assert!(
        store
            .is_published("published_queries", "v2.0", Some(PublishTarget::Kaifang))
            .await?
    );
    assert!(
        !store
            .is_published("published_queries", "v1.0", Some(PublishTarget::Kaifang))
            .await?
    );
    assert!(!store.is_published("published_queries", "-1", None).await?);

    Ok(())
}

pub async fn delete_bot(store: &ConfigStore) -> anyhow::Result<()> {
    store.create_draft("delete_bot").await?;
    let published = store
        .publish_snapshot("delete_bot", "v1.0", PublishTarget::Xingchen)
        .await?;

    let err = store.delete_bot("delete_bot").await.unwrap_err();
    assert!(matches!(err, Error::StillPublished { .. }), "{err}");
    assert!(err.is_conflict());

    store
        .update_publish_status(
            "delete_bot",
            "v1.0",
            PublishTarget::Xingchen,
            StatusOp::Clear,
        )
        .await?;

    assert_eq!(store.delete_bot("delete_bot").await?, 2);
    assert!(store.list_versions("delete_bot").await?.is_empty());

    let err = store.delete_bot("delete_bot").await.unwrap_err();
    assert!(err.is_not_found(), "{err}");

    let draft = store.create_draft("delete_bot").await?;
    assert!(draft.id > published.id);

    Ok(())
}

pub async fn delete_while_publishing(store: &ConfigStore) -> anyhow::Result<()> {
    for round in 0..8 {
        let bot_id = format!("delete_while_publishing_{round}");
        store.create_draft(&bot_id).await?;

        let (deleted, published) = futures_util::join!(
            store.delete_bot(&bot_id),
            store.publish_snapshot(&bot_id, "v1.0", PublishTarget::Aiui),
        );

        let remaining = store.list_versions(&bot_id).await?;

        match (deleted, published) {
            (Ok(deleted), Ok(published)) => {
                assert_eq!(deleted, 1);
                assert_eq!(remaining, vec![published]);
            }
            (Ok(deleted), Err(err)) => {
                assert_eq!(deleted, 1);
                assert!(err.is_not_found(), "{err}");
                assert!(remaining.is_empty());
            }
            (Err(err), Ok(_)) => {
                assert!(matches!(err, Error::StillPublished { .. }), "{err}");
                assert_eq!(remaining.len(), 2);
            }
            (Err(a), Err(b)) => anyhow::bail!("delete `{a}` and publish `{b}` both failed"),
        }
    }

    Ok(())
}

pub async fn validation(store: &ConfigStore) -> anyhow::Result<()> {
    let err = store.create_draft("").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");

    let long_id = "b".repeat(store.config().max_bot_id_len + 1);
    let err = store.create_draft(&long_id).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");

    store.create_draft("validation").await?;

    let long_version = "v".repeat(store.config().max_version_len + 1);

    for version in ["", "-1", long_version.as_str()] {
        let err = store
            .publish_snapshot("validation", version, PublishTarget::Xingchen)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)), "{err}");
    }

    assert_eq!(store.list_versions("validation").await?.len(), 1);

    Ok(())
}
