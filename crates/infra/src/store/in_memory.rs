use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use inkwell_accounts::{NewUser, User};
use inkwell_core::{PostId, UserId};
use inkwell_posts::{NewPost, Post, PostUpdate};

use super::{PostStore, StoreError, UserStore};

#[derive(Debug)]
struct Table<K, V> {
    rows: BTreeMap<K, V>,
    last_id: i64,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<K, V> Table<K, V> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Backend("in-memory table lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Backend("in-memory table lock poisoned".to_string()))
}

/// In-memory user table.
///
/// Intended for tests/dev. The email uniqueness check and the insert happen
/// under one write lock, so concurrent signups race exactly like they would
/// against a unique index.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<Table<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn contains(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(read(&self.table)?.rows.contains_key(&id))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = write(&self.table)?;
        if table.rows.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' already registered",
                user.email
            )));
        }

        let id = UserId::new(table.next_id());
        let row = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = read(&self.table)?;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }
}

/// In-memory post table. Checks authors against the user table it was built
/// with, mirroring the foreign key of the relational schema.
#[derive(Debug)]
pub struct InMemoryPostStore {
    users: Arc<InMemoryUserStore>,
    table: RwLock<Table<PostId, Post>>,
}

impl InMemoryPostStore {
    pub fn new(users: Arc<InMemoryUserStore>) -> Self {
        Self {
            users,
            table: RwLock::new(Table::default()),
        }
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        if !self.users.contains(post.author_id)? {
            return Err(StoreError::MissingReference(format!(
                "author {} does not exist",
                post.author_id
            )));
        }

        let mut table = write(&self.table)?;
        let id = PostId::new(table.next_id());
        let row = Post {
            id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update_owned(
        &self,
        update: PostUpdate,
        author: UserId,
    ) -> Result<Option<PostId>, StoreError> {
        let mut table = write(&self.table)?;
        match table.rows.get_mut(&update.id) {
            Some(row) if row.author_id == author => {
                row.title = update.title;
                row.content = update.content;
                Ok(Some(row.id))
            }
            _ => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        Ok(read(&self.table)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(read(&self.table)?.rows.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_auth::hash_password;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: email.to_string(),
            password: hash_password("pw1").unwrap(),
        }
    }

    fn new_post(author_id: UserId, title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
            author_id,
        }
    }

    #[tokio::test]
    async fn users_get_sequential_ids_and_unique_emails() {
        let users = InMemoryUserStore::new();
        let a = users.create(new_user("a@x.com")).await.unwrap();
        let b = users.create(new_user("b@x.com")).await.unwrap();
        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));

        let err = users.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let found = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, a.id);
        assert!(users.find_by_email("c@x.com").await.unwrap().is_none());
        assert_eq!(users.find_by_email("b@x.com").await.unwrap().unwrap().id, b.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_signups_yield_one_row() {
        let users = InMemoryUserStore::arc();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let users = users.clone();
            handles.push(tokio::spawn(async move {
                users.create(new_user("race@x.com")).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(StoreError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 15);
    }

    #[tokio::test]
    async fn posts_require_existing_author() {
        let users = InMemoryUserStore::arc();
        let posts = InMemoryPostStore::new(users.clone());

        let err = posts.create(new_post(UserId::new(99), "t")).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));

        let author = users.create(new_user("a@x.com")).await.unwrap();
        let post = posts.create(new_post(author.id, "t")).await.unwrap();
        assert_eq!(post.author_id, author.id);
        assert_eq!(posts.get(post.id).await.unwrap(), Some(post));
    }

    #[tokio::test]
    async fn update_only_touches_posts_owned_by_author() {
        let users = InMemoryUserStore::arc();
        let posts = InMemoryPostStore::new(users.clone());
        let owner = users.create(new_user("a@x.com")).await.unwrap();
        let other = users.create(new_user("b@x.com")).await.unwrap();
        let post = posts.create(new_post(owner.id, "original")).await.unwrap();

        let update = PostUpdate {
            id: post.id,
            title: "hijacked".to_string(),
            content: "hijacked".to_string(),
        };
        assert_eq!(posts.update_owned(update.clone(), other.id).await.unwrap(), None);
        assert_eq!(posts.get(post.id).await.unwrap().unwrap().title, "original");

        let missing = PostUpdate {
            id: PostId::new(404),
            ..update.clone()
        };
        assert_eq!(posts.update_owned(missing, owner.id).await.unwrap(), None);

        assert_eq!(posts.update_owned(update, owner.id).await.unwrap(), Some(post.id));
        assert_eq!(posts.get(post.id).await.unwrap().unwrap().title, "hijacked");
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let users = InMemoryUserStore::arc();
        let posts = InMemoryPostStore::new(users.clone());
        let author = users.create(new_user("a@x.com")).await.unwrap();
        for title in ["one", "two", "three"] {
            posts.create(new_post(author.id, title)).await.unwrap();
        }

        let titles: Vec<_> = posts
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
        assert!(posts.get(PostId::new(42)).await.unwrap().is_none());
    }
}
