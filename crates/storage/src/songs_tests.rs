// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

async fn test_store() -> SongStore {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    SongStore::new(db)
}

#[tokio::test]
async fn create_then_get_roundtrips() {
    let store = test_store().await;
    let song = Song::builder().title("Song Title").artist("Artist").build();

    store.create(&song).await.unwrap();
    let fetched = store.get(&song.id).await.unwrap();

    assert_eq!(fetched.title, "Song Title");
    assert_eq!(fetched.source, SongSource::Upload);
    assert!(!fetched.has_audio_files);
}

#[tokio::test]
async fn create_rejects_duplicate_id() {
    let store = test_store().await;
    let song = Song::builder().build();
    store.create(&song).await.unwrap();

    let err = store.create(&song).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn update_persists_enrichment_fields() {
    let store = test_store().await;
    let mut song = Song::builder().build();
    store.create(&song).await.unwrap();

    song.album = Some("Greatest Hits".to_string());
    song.vocals_path = Some("vocals.mp3".to_string());
    song.instrumental_path = Some("instrumental.mp3".to_string());
    song.refresh_has_audio_files();
    store.update(&song).await.unwrap();

    let fetched = store.get(&song.id).await.unwrap();
    assert_eq!(fetched.album.as_deref(), Some("Greatest Hits"));
    assert!(fetched.has_audio_files);
}

#[tokio::test]
async fn delete_removes_row() {
    let store = test_store().await;
    let song = Song::builder().build();
    store.create(&song).await.unwrap();

    store.delete(&song.id).await.unwrap();
    let err = store.get(&song.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn delete_missing_is_not_found() {
    let store = test_store().await;
    let err = store.delete(&SongId::new()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn list_filters_by_favorite() {
    let store = test_store().await;
    let mut favorite = Song::builder().title("Fav").build();
    favorite.favorite = true;
    store.create(&favorite).await.unwrap();
    store.create(&Song::builder().title("Not fav").build()).await.unwrap();

    let filter = SongFilter { favorite: Some(true), ..Default::default() };
    let songs = store.list(&filter).await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].title, "Fav");
}

#[tokio::test]
async fn raw_provider_metadata_roundtrips_as_json() {
    let store = test_store().await;
    let mut song = Song::builder().build();
    song.raw_provider_metadata = Some(serde_json::json!({"trackId": 123}));
    store.create(&song).await.unwrap();

    let fetched = store.get(&song.id).await.unwrap();
    assert_eq!(fetched.raw_provider_metadata.unwrap()["trackId"], 123);
}
