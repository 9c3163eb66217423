//! Resource consistency engine.
//!
//! The only place that deletes across tables. There is no transaction around these
//! sequences, so each one is ordered so that any prefix of it leaves the data coherent:
//! dependents go first, the parent last. A crash mid-sequence can at worst leave a
//! parent without dependents, and re-running the whole sequence is always safe because
//! every step is an idempotent delete.

use std::collections::HashSet;

use crate::{
    error::{ApiError, ApiResult},
    repository::Repository,
};

/// Rows removed by a cascade, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    pub comments: u64,
    pub associations: u64,
}

/// Result of an attach: the de-duplicated request and how many rows were new.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttachReport {
    pub categories: Vec<i64>,
    pub inserted: u64,
}

/// Collapses repeated ids, keeping the first occurrence of each in its original position.
pub fn dedup_first_occurrence(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// cascade_delete_post
///
/// Removes the post's comments, then its category associations, then the post. If the
/// final step affects no row the post was already gone and the result is `NotFound`;
/// the dependent deletes that ran are harmless no-ops or cleanup.
#[tracing::instrument(skip(repo))]
pub async fn cascade_delete_post(repo: &dyn Repository, post_id: i64) -> ApiResult<CascadeReport> {
    let comments = repo.delete_comments_for_post(post_id).await?;
    let associations = repo.delete_post_categories_for_post(post_id).await?;
    let removed = repo.delete_post(post_id).await?;

    if removed == 0 {
        tracing::debug!(comments, associations, "post already absent");
        return Err(ApiError::not_found("Post not found"));
    }

    tracing::info!(comments, associations, "post removed");
    Ok(CascadeReport {
        comments,
        associations,
    })
}

/// cascade_delete_category
///
/// Removes the category's associations, then the category. Posts are never touched.
#[tracing::instrument(skip(repo))]
pub async fn cascade_delete_category(
    repo: &dyn Repository,
    category_id: i64,
) -> ApiResult<CascadeReport> {
    let associations = repo.delete_post_categories_for_category(category_id).await?;
    let removed = repo.delete_category(category_id).await?;

    if removed == 0 {
        return Err(ApiError::not_found("Category not found"));
    }

    tracing::info!(associations, "category removed");
    Ok(CascadeReport {
        comments: 0,
        associations,
    })
}

/// attach_categories
///
/// Confirms the post exists, de-duplicates `requested`, checks that every category
/// exists before writing anything, then inserts each missing association in order.
/// Pairs that already exist are skipped by the store's insert-or-ignore, so the call
/// succeeds the same way whether some, all, or none of the pairs were new.
///
/// If the post is deleted concurrently, the foreign key rejects the late insert and
/// the result is `NotFound`.
#[tracing::instrument(skip(repo))]
pub async fn attach_categories(
    repo: &dyn Repository,
    post_id: i64,
    requested: &[i64],
) -> ApiResult<AttachReport> {
    if repo.get_post(post_id).await?.is_none() {
        return Err(ApiError::not_found("Post not found"));
    }

    let categories = dedup_first_occurrence(requested);

    for category_id in &categories {
        if repo.get_category(*category_id).await?.is_none() {
            return Err(ApiError::not_found(format!("Category {category_id} not found")));
        }
    }

    let mut inserted = 0;
    for category_id in &categories {
        inserted += repo
            .insert_post_category(post_id, *category_id)
            .await
            .map_err(|err| ApiError::missing_parent(err, "Post not found"))?;
    }

    tracing::debug!(requested = requested.len(), unique = categories.len(), inserted, "categories attached");
    Ok(AttachReport {
        categories,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        assert_eq!(dedup_first_occurrence(&[2, 2, 3, 2]), vec![2, 3]);
        assert_eq!(dedup_first_occurrence(&[5, 1, 5, 4, 1, 4]), vec![5, 1, 4]);
        assert_eq!(dedup_first_occurrence(&[]), Vec::<i64>::new());
    }

    #[test]
    fn dedup_is_independent_of_repetition_count() {
        let long: Vec<i64> = std::iter::repeat([2, 3]).take(500).flatten().collect();
        assert_eq!(dedup_first_occurrence(&long), vec![2, 3]);
    }
}
