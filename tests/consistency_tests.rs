mod common;

use blog_platform::{
    consistency::{self, AttachReport, CascadeReport},
    error::ApiError,
    repository::Repository,
};
use common::*;

// --- Post cascade ---

#[tokio::test]
async fn post_cascade_removes_dependents_before_the_post() {
    let repo = RecordingRepo::new(store().await);
    let (_, ana, ben) = seed_people(&repo).await;
    let post = seed_post(&repo, ana.id, "Hello").await;
    seed_comment(&repo, post.id, ana.id).await;
    seed_comment(&repo, post.id, ben.id).await;
    let rust = seed_category(&repo, "rust").await;
    repo.insert_post_category(post.id, rust.id).await.unwrap();
    repo.reset_calls();

    let report = consistency::cascade_delete_post(&repo, post.id).await.unwrap();

    assert_eq!(report, CascadeReport { comments: 2, associations: 1 });
    assert_eq!(
        repo.calls(),
        vec!["delete_comments_for_post", "delete_post_categories_for_post", "delete_post"]
    );
    assert!(repo.get_post(post.id).await.unwrap().is_none());
    assert!(repo.comments_for_post(post.id).await.unwrap().is_empty());
    assert!(repo.categories_for_post(post.id).await.unwrap().is_empty());
    // The category itself survives.
    assert!(repo.get_category(rust.id).await.unwrap().is_some());
}

#[tokio::test]
async fn post_cascade_twice_reports_not_found_without_touching_other_posts() {
    let repo = store().await;
    let (_, ana, ben) = seed_people(&repo).await;
    let doomed = seed_post(&repo, ana.id, "Doomed").await;
    let other = seed_post(&repo, ben.id, "Other").await;
    seed_comment(&repo, other.id, ana.id).await;

    consistency::cascade_delete_post(&repo, doomed.id).await.unwrap();
    let second = consistency::cascade_delete_post(&repo, doomed.id).await;

    assert!(matches!(second, Err(ApiError::NotFound(_))));
    assert!(repo.get_post(other.id).await.unwrap().is_some());
    assert_eq!(repo.comments_for_post(other.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn interrupted_post_cascade_leaves_no_dangling_dependents_and_can_be_rerun() {
    let repo = RecordingRepo::new(store().await);
    let (_, ana, _) = seed_people(&repo).await;
    let post = seed_post(&repo, ana.id, "Half gone").await;
    seed_comment(&repo, post.id, ana.id).await;
    let rust = seed_category(&repo, "rust").await;
    repo.insert_post_category(post.id, rust.id).await.unwrap();

    // Crash on the final step: dependents are gone, the post is still there.
    repo.fail_on("delete_post");
    let interrupted = consistency::cascade_delete_post(&repo, post.id).await;
    assert!(matches!(interrupted, Err(ApiError::Internal(_))));
    assert!(repo.get_post(post.id).await.unwrap().is_some());
    assert!(repo.comments_for_post(post.id).await.unwrap().is_empty());
    assert!(repo.categories_for_post(post.id).await.unwrap().is_empty());

    // Re-running the whole sequence finishes the job.
    repo.heal();
    let report = consistency::cascade_delete_post(&repo, post.id).await.unwrap();
    assert_eq!(report, CascadeReport::default());
    assert!(repo.get_post(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn post_cascade_stops_at_the_first_failed_step() {
    let repo = RecordingRepo::new(store().await);
    let (_, ana, _) = seed_people(&repo).await;
    let post = seed_post(&repo, ana.id, "Partial").await;
    seed_comment(&repo, post.id, ana.id).await;
    let rust = seed_category(&repo, "rust").await;
    repo.insert_post_category(post.id, rust.id).await.unwrap();
    repo.reset_calls();

    repo.fail_on("delete_post_categories_for_post");
    assert!(consistency::cascade_delete_post(&repo, post.id).await.is_err());

    assert!(!repo.called("delete_post"));
    assert!(repo.comments_for_post(post.id).await.unwrap().is_empty());
    assert_eq!(ids(&repo.categories_for_post(post.id).await.unwrap()), vec![rust.id]);
    assert!(repo.get_post(post.id).await.unwrap().is_some());
}

// --- Category cascade ---

#[tokio::test]
async fn category_cascade_detaches_then_removes_and_keeps_posts() {
    let repo = RecordingRepo::new(store().await);
    let (_, ana, _) = seed_people(&repo).await;
    let first = seed_post(&repo, ana.id, "First").await;
    let second = seed_post(&repo, ana.id, "Second").await;
    let rust = seed_category(&repo, "rust").await;
    let go = seed_category(&repo, "go").await;
    repo.insert_post_category(first.id, rust.id).await.unwrap();
    repo.insert_post_category(second.id, rust.id).await.unwrap();
    repo.insert_post_category(second.id, go.id).await.unwrap();
    repo.reset_calls();

    let report = consistency::cascade_delete_category(&repo, rust.id).await.unwrap();

    assert_eq!(report.associations, 2);
    assert_eq!(
        repo.calls(),
        vec!["delete_post_categories_for_category", "delete_category"]
    );
    assert!(repo.get_post(first.id).await.unwrap().is_some());
    assert!(repo.get_post(second.id).await.unwrap().is_some());
    assert_eq!(ids(&repo.categories_for_post(second.id).await.unwrap()), vec![go.id]);
}

#[tokio::test]
async fn category_cascade_on_missing_category_is_not_found() {
    let repo = store().await;
    let result = consistency::cascade_delete_category(&repo, 99).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

// --- Attach ---

#[tokio::test]
async fn attach_collapses_repeats_in_first_occurrence_order() {
    let repo = store().await;
    let (_, ana, _) = seed_people(&repo).await;
    let post = seed_post(&repo, ana.id, "Tagged").await;
    seed_category(&repo, "one").await;
    let two = seed_category(&repo, "two").await;
    let three = seed_category(&repo, "three").await;

    let report = consistency::attach_categories(&repo, post.id, &[two.id, two.id, three.id, two.id])
        .await
        .unwrap();

    assert_eq!(
        report,
        AttachReport {
            categories: vec![two.id, three.id],
            inserted: 2,
        }
    );
    assert_eq!(
        ids(&repo.categories_for_post(post.id).await.unwrap()),
        vec![two.id, three.id]
    );
}

#[tokio::test]
async fn attach_onto_existing_association_adds_only_the_missing_pair() {
    let repo = store().await;
    let (_, ana, _) = seed_people(&repo).await;
    let post = seed_post(&repo, ana.id, "Tagged").await;
    let two = seed_category(&repo, "two").await;
    let three = seed_category(&repo, "three").await;
    repo.insert_post_category(post.id, two.id).await.unwrap();

    let report = consistency::attach_categories(&repo, post.id, &[two.id, three.id])
        .await
        .unwrap();
    assert_eq!(report.inserted, 1);

    // Same request again: success, nothing new.
    let again = consistency::attach_categories(&repo, post.id, &[two.id, three.id])
        .await
        .unwrap();
    assert_eq!(again.inserted, 0);

    assert_eq!(
        ids(&repo.categories_for_post(post.id).await.unwrap()),
        vec![two.id, three.id]
    );
}

#[tokio::test]
async fn attach_with_an_unknown_category_writes_nothing() {
    let repo = RecordingRepo::new(store().await);
    let (_, ana, _) = seed_people(&repo).await;
    let post = seed_post(&repo, ana.id, "Tagged").await;
    let known = seed_category(&repo, "known").await;
    repo.reset_calls();

    let result = consistency::attach_categories(&repo, post.id, &[known.id, 404]).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(!repo.called("insert_post_category"));
    assert!(repo.categories_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn attach_to_missing_post_is_not_found() {
    let repo = store().await;
    let category = seed_category(&repo, "orphan").await;

    let result = consistency::attach_categories(&repo, 42, &[category.id]).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn attach_racing_a_post_delete_is_rejected_by_the_foreign_key() {
    let backing = store().await;
    let (_, ana, _) = seed_people(&backing).await;
    let post = seed_post(&backing, ana.id, "Vanishing").await;
    let category = seed_category(&backing, "late").await;
    consistency::cascade_delete_post(&backing, post.id).await.unwrap();

    // The existence check still sees the post; the insert lands after the delete.
    let repo = RecordingRepo::new(backing).with_phantom_post(post.clone());
    let result = consistency::attach_categories(&repo, post.id, &[category.id]).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(repo.called("insert_post_category"));
}
