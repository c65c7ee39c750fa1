//! Database repository for members and teams.
//!
//! Dynamic searches are assembled with `sqlx::QueryBuilder` from the
//! predicates in [`crate::search`]. Multi-statement operations hold a single
//! connection or transaction for their whole duration.

use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateMemberRequest, Member, MemberSearchCondition, MemberSummary, MemberTeamRow, Page,
    PageRequest, Team,
};
use crate::search::{self, page, MemberPredicate};

/// Number of members created by [`Repository::seed_sample_data`].
pub const SAMPLE_MEMBER_COUNT: i32 = 200;

const MEMBER_TEAM_SELECT: &str = "SELECT m.id AS member_id, m.username, m.age, t.id AS team_id, t.name AS team_name FROM member m LEFT JOIN team t ON m.team_id = t.id";

const MEMBER_TEAM_COUNT: &str =
    "SELECT COUNT(*) AS total FROM member m LEFT JOIN team t ON m.team_id = t.id";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== TEAM OPERATIONS ====================

    /// Create a new team.
    pub async fn save_team(&self, name: &str) -> Result<Team, AppError> {
        let result = sqlx::query("INSERT INTO team (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Team {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Get a team by ID.
    pub async fn find_team_by_id(&self, id: i64) -> Result<Option<Team>, AppError> {
        let row = sqlx::query("SELECT id, name FROM team WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(team_from_row))
    }

    /// List all teams.
    pub async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM team ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(team_from_row).collect())
    }

    /// Members currently assigned to a team.
    ///
    /// Membership is read from `member.team_id`; there is no separate
    /// collection to keep in sync.
    pub async fn team_members(&self, team_id: i64) -> Result<Vec<Member>, AppError> {
        let rows =
            sqlx::query("SELECT id, username, age, team_id FROM member WHERE team_id = ? ORDER BY id")
                .bind(team_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    // ==================== MEMBER OPERATIONS ====================

    /// Create a new member, optionally assigned to an existing team.
    pub async fn save_member(&self, request: &CreateMemberRequest) -> Result<Member, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(team_id) = request.team_id {
            ensure_team_exists(&mut tx, team_id).await?;
        }

        let result = sqlx::query("INSERT INTO member (username, age, team_id) VALUES (?, ?, ?)")
            .bind(&request.username)
            .bind(request.age)
            .bind(request.team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Member {
            id: result.last_insert_rowid(),
            username: request.username.clone(),
            age: request.age,
            team_id: request.team_id,
        })
    }

    /// Get a member by ID.
    pub async fn find_member_by_id(&self, id: i64) -> Result<Option<Member>, AppError> {
        let row = sqlx::query("SELECT id, username, age, team_id FROM member WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// List all members.
    pub async fn find_all_members(&self) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query("SELECT id, username, age, team_id FROM member ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// List members with exactly this username.
    pub async fn find_members_by_username(&self, username: &str) -> Result<Vec<Member>, AppError> {
        let rows =
            sqlx::query("SELECT id, username, age, team_id FROM member WHERE username = ? ORDER BY id")
                .bind(username)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Username and age of every member.
    pub async fn list_member_summaries(&self) -> Result<Vec<MemberSummary>, AppError> {
        let rows = sqlx::query("SELECT username, age FROM member ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| MemberSummary {
                username: row.get("username"),
                age: row.get("age"),
            })
            .collect())
    }

    /// Move a member to another team.
    ///
    /// Runs in one transaction: an unknown team or member leaves the member
    /// untouched.
    pub async fn change_team(&self, member_id: i64, team_id: i64) -> Result<Member, AppError> {
        let mut tx = self.pool.begin().await?;

        ensure_team_exists(&mut tx, team_id).await?;

        let result = sqlx::query("UPDATE member SET team_id = ? WHERE id = ?")
            .bind(team_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", member_id)));
        }

        let row = sqlx::query("SELECT id, username, age, team_id FROM member WHERE id = ?")
            .bind(member_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(member_id, team_id, "Member changed team");
        Ok(member_from_row(&row))
    }

    // ==================== SEARCH OPERATIONS ====================

    /// All member/team rows matching `condition`, in no particular order.
    pub async fn search(
        &self,
        condition: &MemberSearchCondition,
    ) -> Result<Vec<MemberTeamRow>, AppError> {
        let predicate = search::compose(condition);
        let mut conn = self.pool.acquire().await?;
        fetch_member_team_rows(&mut conn, predicate.as_ref(), None).await
    }

    /// One page of matching rows; always runs the count query.
    pub async fn search_page_simple(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> Result<Page<MemberTeamRow>, AppError> {
        let predicate = search::compose(condition);
        let mut conn = self.pool.acquire().await?;

        let content = fetch_member_team_rows(&mut conn, predicate.as_ref(), Some(request)).await?;
        let total = count_member_team_rows(&mut conn, predicate.as_ref()).await?;

        Ok(Page::new(content, request, total))
    }

    /// One page of matching rows; runs the count query only when the page
    /// content does not already determine the total.
    pub async fn search_page_optimized(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> Result<Page<MemberTeamRow>, AppError> {
        let predicate = search::compose(condition);
        let mut conn = self.pool.acquire().await?;

        let content = fetch_member_team_rows(&mut conn, predicate.as_ref(), Some(request)).await?;
        let total = match page::known_total(content.len(), request) {
            Some(total) => {
                tracing::debug!(total, page = request.page, "Count query skipped");
                total
            }
            None => count_member_team_rows(&mut conn, predicate.as_ref()).await?,
        };

        Ok(Page::new(content, request, total))
    }

    // ==================== SAMPLE DATA ====================

    /// Create `teamA`, `teamB` and [`SAMPLE_MEMBER_COUNT`] members
    /// (`member{i}`, age `i`, alternating teams).
    ///
    /// Does nothing when the member table is not empty. Returns the number of
    /// members created.
    pub async fn seed_sample_data(&self) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query("SELECT COUNT(*) AS total FROM member")
            .fetch_one(&mut *tx)
            .await?
            .get("total");
        if existing > 0 {
            tracing::info!("Sample data skipped: {} members already present", existing);
            return Ok(0);
        }

        let mut team_ids = Vec::with_capacity(2);
        for name in ["teamA", "teamB"] {
            let result = sqlx::query("INSERT INTO team (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await?;
            team_ids.push(result.last_insert_rowid());
        }

        for i in 0..SAMPLE_MEMBER_COUNT {
            let team_id = team_ids[(i % 2) as usize];
            sqlx::query("INSERT INTO member (username, age, team_id) VALUES (?, ?, ?)")
                .bind(format!("member{}", i))
                .bind(i)
                .bind(team_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("Sample data created: {} members", SAMPLE_MEMBER_COUNT);
        Ok(SAMPLE_MEMBER_COUNT as usize)
    }
}

// Query helpers shared by the search operations

async fn ensure_team_exists(conn: &mut SqliteConnection, team_id: i64) -> Result<(), AppError> {
    let row = sqlx::query("SELECT id FROM team WHERE id = ?")
        .bind(team_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Team {} not found", team_id))),
    }
}

async fn fetch_member_team_rows(
    conn: &mut SqliteConnection,
    predicate: Option<&MemberPredicate>,
    request: Option<&PageRequest>,
) -> Result<Vec<MemberTeamRow>, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new(MEMBER_TEAM_SELECT);
    search::push_where(&mut builder, predicate);

    if let Some(request) = request {
        if let Some(sort) = request.sort {
            builder
                .push(" ORDER BY ")
                .push(sort.property.column())
                .push(" ")
                .push(sort.direction.as_sql());
        }
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(request.size))
            .push(" OFFSET ")
            .push_bind(offset);
    }

    let rows = builder.build().fetch_all(&mut *conn).await?;
    Ok(rows.iter().map(member_team_row_from_row).collect())
}

async fn count_member_team_rows(
    conn: &mut SqliteConnection,
    predicate: Option<&MemberPredicate>,
) -> Result<u64, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new(MEMBER_TEAM_COUNT);
    search::push_where(&mut builder, predicate);

    let row = builder.build().fetch_one(&mut *conn).await?;
    let total: i64 = row.get("total");
    Ok(u64::try_from(total).unwrap_or(0))
}

// Helper functions for row conversion

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Member {
    Member {
        id: row.get("id"),
        username: row.get("username"),
        age: row.get("age"),
        team_id: row.get("team_id"),
    }
}

fn team_from_row(row: &sqlx::sqlite::SqliteRow) -> Team {
    Team {
        id: row.get("id"),
        name: row.get("name"),
    }
}

fn member_team_row_from_row(row: &sqlx::sqlite::SqliteRow) -> MemberTeamRow {
    MemberTeamRow {
        member_id: row.get("member_id"),
        username: row.get("username"),
        age: row.get("age"),
        team_id: row.get("team_id"),
        team_name: row.get("team_name"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{Sort, SortProperty};
    use tempfile::TempDir;

    async fn setup() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    /// member1..member4 aged 10/20/30/40 in teamA/teamA/teamB/teamB.
    async fn setup_four_members() -> (Repository, TempDir, Team, Team) {
        let (repo, temp_dir) = setup().await;
        let team_a = repo.save_team("teamA").await.unwrap();
        let team_b = repo.save_team("teamB").await.unwrap();
        for (i, team) in [&team_a, &team_a, &team_b, &team_b].iter().enumerate() {
            let n = i as i32 + 1;
            let request = CreateMemberRequest::new(format!("member{}", n), n * 10).with_team(team.id);
            repo.save_member(&request).await.unwrap();
        }
        (repo, temp_dir, team_a, team_b)
    }

    fn usernames(rows: &[MemberTeamRow]) -> Vec<&str> {
        rows.iter().map(|r| r.username.as_str()).collect()
    }

    fn sorted_usernames(rows: &[MemberTeamRow]) -> Vec<String> {
        let mut names: Vec<String> = rows.iter().map(|r| r.username.clone()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_basic_save_and_find() {
        let (repo, _dir) = setup().await;

        let member = repo
            .save_member(&CreateMemberRequest::new("member1", 10))
            .await
            .unwrap();

        let found = repo.find_member_by_id(member.id).await.unwrap();
        assert_eq!(found, Some(member.clone()));

        let by_username = repo.find_members_by_username("member1").await.unwrap();
        assert_eq!(by_username.len(), 1);
        assert_eq!(by_username[0].username, "member1");

        let all = repo.find_all_members().await.unwrap();
        assert_eq!(all, vec![member]);
    }

    #[tokio::test]
    async fn test_missing_rows_are_none() {
        let (repo, _dir) = setup().await;
        assert_eq!(repo.find_member_by_id(404).await.unwrap(), None);
        assert_eq!(repo.find_team_by_id(404).await.unwrap(), None);
        assert!(repo.find_members_by_username("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_member_with_unknown_team() {
        let (repo, _dir) = setup().await;
        let err = repo
            .save_member(&CreateMemberRequest::new("orphan", 5).with_team(99))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(repo.find_all_members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_team_and_age_range() {
        let (repo, _dir, _, _) = setup_four_members().await;

        let condition = MemberSearchCondition::default()
            .age_goe(35)
            .age_loe(40)
            .team_name("teamB");
        let result = repo.search(&condition).await.unwrap();

        assert_eq!(usernames(&result), vec!["member4"]);
        assert_eq!(result[0].age, 40);
        assert_eq!(result[0].team_name.as_deref(), Some("teamB"));
    }

    #[tokio::test]
    async fn test_empty_condition_returns_full_left_join() {
        let (repo, _dir, _, _) = setup_four_members().await;
        repo.save_member(&CreateMemberRequest::new("loner", 50))
            .await
            .unwrap();

        let blank = MemberSearchCondition::default().username("").team_name(" ");
        for condition in [MemberSearchCondition::default(), blank] {
            let result = repo.search(&condition).await.unwrap();
            assert_eq!(
                sorted_usernames(&result),
                vec!["loner", "member1", "member2", "member3", "member4"]
            );
            let loner = result.iter().find(|r| r.username == "loner").unwrap();
            assert_eq!(loner.team_id, None);
            assert_eq!(loner.team_name, None);
        }
    }

    #[tokio::test]
    async fn test_sql_filters_agree_with_in_memory_predicates() {
        let (repo, _dir, _, _) = setup_four_members().await;
        repo.save_member(&CreateMemberRequest::new("loner", 25))
            .await
            .unwrap();
        let everything = repo.search(&MemberSearchCondition::default()).await.unwrap();

        let bounds = [None, Some(10), Some(25), Some(40)];
        let team_names = [None, Some("teamA"), Some("teamB")];
        for age_goe in bounds {
            for age_loe in bounds {
                for team_name in team_names {
                    let condition = MemberSearchCondition {
                        username: None,
                        team_name: team_name.map(str::to_string),
                        age_goe,
                        age_loe,
                    };
                    let expected: Vec<MemberTeamRow> = match search::compose(&condition) {
                        Some(p) => everything.iter().filter(|r| p.matches(r)).cloned().collect(),
                        None => everything.clone(),
                    };
                    let actual = repo.search(&condition).await.unwrap();
                    assert_eq!(
                        sorted_usernames(&actual),
                        sorted_usernames(&expected),
                        "condition {:?}",
                        condition
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_age_bounds_individually() {
        let (repo, _dir, _, _) = setup_four_members().await;

        let lower = MemberSearchCondition::default().age_goe(30);
        assert_eq!(
            sorted_usernames(&repo.search(&lower).await.unwrap()),
            vec!["member3", "member4"]
        );

        let upper = MemberSearchCondition::default().age_loe(20);
        assert_eq!(
            sorted_usernames(&repo.search(&upper).await.unwrap()),
            vec!["member1", "member2"]
        );

        let both = MemberSearchCondition::default().age_goe(20).age_loe(30);
        assert_eq!(
            sorted_usernames(&repo.search(&both).await.unwrap()),
            vec!["member2", "member3"]
        );
    }

    #[tokio::test]
    async fn test_search_page_simple_sorted_desc() {
        let (repo, _dir, _, _) = setup_four_members().await;

        let request = PageRequest::of(0, 3).sorted(Sort::desc(SortProperty::Username));
        let page = repo
            .search_page_simple(&MemberSearchCondition::default(), &request)
            .await
            .unwrap();

        assert_eq!(page.content.len(), 3);
        assert_eq!(page.total_elements, 4);
        assert_eq!(usernames(&page.content), vec!["member4", "member3", "member2"]);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_search_page_optimized_sorted_desc() {
        let (repo, _dir, _, _) = setup_four_members().await;

        let request = PageRequest::of(0, 3).sorted(Sort::desc(SortProperty::Username));
        let page = repo
            .search_page_optimized(&MemberSearchCondition::default(), &request)
            .await
            .unwrap();

        assert_eq!(usernames(&page.content), vec!["member4", "member3", "member2"]);
        assert_eq!(page.total_elements, 4);

        let request = PageRequest::of(1, 3).sorted(Sort::desc(SortProperty::Username));
        let last = repo
            .search_page_optimized(&MemberSearchCondition::default(), &request)
            .await
            .unwrap();
        assert_eq!(usernames(&last.content), vec!["member1"]);
        assert_eq!(last.total_elements, 4);
        assert!(last.last);
    }

    #[tokio::test]
    async fn test_pagination_strategies_agree() {
        let (repo, _dir, _, _) = setup_four_members().await;
        repo.save_member(&CreateMemberRequest::new("loner", 25))
            .await
            .unwrap();

        let conditions = [
            MemberSearchCondition::default(),
            MemberSearchCondition::default().team_name("teamA"),
            MemberSearchCondition::default().age_goe(15),
            MemberSearchCondition::default().age_loe(30).team_name("teamB"),
            MemberSearchCondition::default().username("nobody"),
        ];
        let sort = Sort::asc(SortProperty::Id);
        for condition in &conditions {
            for size in 1..=6 {
                for page_index in 0..=5 {
                    let request = PageRequest::of(page_index, size).sorted(sort);
                    let simple = repo.search_page_simple(condition, &request).await.unwrap();
                    let optimized = repo.search_page_optimized(condition, &request).await.unwrap();
                    assert_eq!(
                        simple, optimized,
                        "condition {:?} request {:?}",
                        condition, request
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_change_team_updates_both_views() {
        let (repo, _dir, team_a, team_b) = setup_four_members().await;
        let member1 = repo.find_members_by_username("member1").await.unwrap().remove(0);

        let moved = repo.change_team(member1.id, team_b.id).await.unwrap();
        assert_eq!(moved.team_id, Some(team_b.id));

        let a_members = repo.team_members(team_a.id).await.unwrap();
        let b_members = repo.team_members(team_b.id).await.unwrap();
        assert!(a_members.iter().all(|m| m.id != member1.id));
        assert!(b_members.iter().any(|m| m.id == member1.id));
        assert_eq!(a_members.len(), 1);
        assert_eq!(b_members.len(), 3);

        let found = repo.find_member_by_id(member1.id).await.unwrap().unwrap();
        assert_eq!(found.team_id, Some(team_b.id));
    }

    #[tokio::test]
    async fn test_change_team_to_missing_team_leaves_member_unchanged() {
        let (repo, _dir, team_a, _) = setup_four_members().await;
        let member1 = repo.find_members_by_username("member1").await.unwrap().remove(0);

        let err = repo.change_team(member1.id, 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let found = repo.find_member_by_id(member1.id).await.unwrap().unwrap();
        assert_eq!(found.team_id, Some(team_a.id));

        let err = repo.change_team(999, team_a.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_member_summaries() {
        let (repo, _dir, _, _) = setup_four_members().await;
        let summaries = repo.list_member_summaries().await.unwrap();
        assert_eq!(summaries.len(), 4);
        assert_eq!(
            summaries[0],
            MemberSummary {
                username: "member1".to_string(),
                age: 10
            }
        );
    }

    #[tokio::test]
    async fn test_seed_sample_data_is_idempotent() {
        let (repo, _dir) = setup().await;

        assert_eq!(repo.seed_sample_data().await.unwrap(), SAMPLE_MEMBER_COUNT as usize);
        assert_eq!(repo.seed_sample_data().await.unwrap(), 0);

        let teams = repo.list_teams().await.unwrap();
        assert_eq!(teams.len(), 2);
        let team_a = teams.iter().find(|t| t.name == "teamA").unwrap();
        assert_eq!(repo.team_members(team_a.id).await.unwrap().len(), 100);

        let condition = MemberSearchCondition::default().team_name("teamB").age_goe(190);
        let rows = repo.search(&condition).await.unwrap();
        assert_eq!(
            sorted_usernames(&rows),
            vec!["member191", "member193", "member195", "member197", "member199"]
        );
    }
}
