use super::validation::{validate_credentials, validate_email, validate_non_negative};
use crate::application_port::{UserError, UserService, UserUpdate};
use crate::domain_model::*;
use crate::domain_port::{TxManager, UserRepo};
use std::sync::Arc;
use tracing::info;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealUserService {
    pub fn new(user_repo: Arc<dyn UserRepo>, tx_manager: Arc<dyn TxManager>) -> RealUserService {
        RealUserService {
            user_repo,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn get(&self, id: UserId) -> Result<User, UserError> {
        let rec = self.user_repo.get(id.key()).await?;
        Ok(User::from(rec))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, UserError> {
        validate_email(email).map_err(UserError::Validation)?;
        let rec = self.user_repo.get_by_email(email).await?;
        Ok(User::from(rec))
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<User>, UserError> {
        let rows = self.user_repo.list(page).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update(&self, update: UserUpdate) -> Result<User, UserError> {
        validate_credentials(&update.login, &update.password).map_err(UserError::Validation)?;
        validate_email(&update.email).map_err(UserError::Validation)?;
        validate_non_negative("wallet", update.wallet).map_err(UserError::Validation)?;
        if update.purchase_count < 0 {
            return Err(UserError::Validation(
                "purchase_count must not be negative".to_string(),
            ));
        }

        let key = update.id.key();
        let profile = UserProfile {
            key,
            login: update.login,
            name: update.name,
            last_name: update.last_name,
            phone_number: update.phone_number,
            email: update.email,
            wallet: update.wallet,
            purchase_count: update.purchase_count,
        };

        let mut tx = self.tx_manager.begin().await?;

        if !self.user_repo.id_exists_in_tx(&mut *tx, key).await? {
            return Err(UserError::NotFound);
        }
        self.user_repo.update_in_tx(&mut *tx, &profile).await?;

        tx.commit().await?;

        info!(user_id = %update.id, "user updated");
        self.get(update.id).await
    }

    async fn delete(&self, id: UserId) -> Result<(), UserError> {
        let mut tx = self.tx_manager.begin().await?;

        if !self.user_repo.id_exists_in_tx(&mut *tx, id.key()).await? {
            return Err(UserError::NotFound);
        }
        self.user_repo.delete_in_tx(&mut *tx, id.key()).await?;

        tx.commit().await?;

        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::application_port::*;
    use crate::domain_model::*;
    use crate::test_support::{TestContext, new_user};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    fn update_of(user: &User) -> UserUpdate {
        UserUpdate {
            id: UserId(user.id),
            login: user.login.clone(),
            name: user.name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            email: user.email.clone(),
            password: "secret-pw".to_string(),
            wallet: user.wallet,
            purchase_count: user.purchase_count,
        }
    }

    #[tokio::test]
    async fn email_lookup_finds_existing_and_misses_absent() -> TestResult {
        let ctx = TestContext::new();
        let user = ctx.auth.signup(new_user("jane", "jane@example.com")).await?;

        let found = ctx.users.get_by_email("jane@example.com").await?;
        assert_eq!(found.id, user.id);

        let missing = ctx.users.get_by_email("nobody@example.com").await;
        assert!(matches!(missing, Err(UserError::NotFound)));

        let invalid = ctx.users.get_by_email("not-an-email").await;
        assert!(matches!(invalid, Err(UserError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_rewrites_profile_and_wallet() -> TestResult {
        let ctx = TestContext::new();
        let user = ctx.auth.signup(new_user("jane", "jane@example.com")).await?;

        let mut update = update_of(&user);
        update.name = "Janet".to_string();
        update.wallet = Decimal::new(12_50, 2);
        let updated = ctx.users.update(update).await?;

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.name, "Janet");
        assert_eq!(updated.wallet, Decimal::new(12_50, 2));
        assert_eq!(ctx.users.get(UserId(user.id)).await?, updated);
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_bad_input_and_unknown_users() -> TestResult {
        let ctx = TestContext::new();
        let user = ctx.auth.signup(new_user("jane", "jane@example.com")).await?;

        let mut negative = update_of(&user);
        negative.wallet = Decimal::new(-1, 0);
        let res = ctx.users.update(negative).await;
        assert!(matches!(res, Err(UserError::Validation(_))));

        let mut no_password = update_of(&user);
        no_password.password.clear();
        let res = ctx.users.update(no_password).await;
        assert!(matches!(res, Err(UserError::Validation(_))));

        let mut unknown = update_of(&user);
        unknown.id = UserId(user.id + 1);
        let res = ctx.users.update(unknown).await;
        assert!(matches!(res, Err(UserError::NotFound)));
        Ok(())
    }

    #[tokio::test]
    async fn update_to_a_taken_email_conflicts() -> TestResult {
        let ctx = TestContext::new();
        ctx.auth.signup(new_user("jane", "jane@example.com")).await?;
        let bob = ctx.auth.signup(new_user("bob", "bob@example.com")).await?;

        let mut update = update_of(&bob);
        update.email = "jane@example.com".to_string();
        let res = ctx.users.update(update).await;
        assert!(matches!(res, Err(UserError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() -> TestResult {
        let ctx = TestContext::new();
        let user = ctx.auth.signup(new_user("jane", "jane@example.com")).await?;

        ctx.users.delete(UserId(user.id)).await?;

        let res = ctx.users.get(UserId(user.id)).await;
        assert!(matches!(res, Err(UserError::NotFound)));
        let res = ctx.users.delete(UserId(user.id)).await;
        assert!(matches!(res, Err(UserError::NotFound)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let ctx = TestContext::new();
        let res = ctx.users.delete(UserId(987_654)).await;
        assert!(matches!(res, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn list_pages_through_users() -> TestResult {
        let ctx = TestContext::new();
        for i in 0..5 {
            ctx.auth
                .signup(new_user(&format!("user{i}"), &format!("user{i}@example.com")))
                .await?;
        }

        assert_eq!(ctx.users.list(None).await?.len(), 5);
        let page = ctx.users.list(PageRequest::new(3, 10)).await?;
        assert_eq!(page.len(), 2);
        let page = ctx.users.list(PageRequest::new(0, 2)).await?;
        assert_eq!(page.len(), 2);
        Ok(())
    }
}
