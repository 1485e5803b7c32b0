use crate::{
    database::{DocumentStore, auth::AuthService, encode, find},
    error::AppError,
    model::person::{Identity, Person, Role, Student, Teacher},
};

/// Finds the person of the given role registered under `email`.
///
/// Only meant to run after the credentials were confirmed; it does no authentication itself.
pub async fn find_identity(
    store: &dyn DocumentStore,
    email: &str,
    role: Role,
) -> Result<Option<Identity>, AppError> {
    let people: Vec<Person> = find(store, role.collection(), "email", email).await?;

    Ok(people.into_iter().next().map(|person| Identity {
        id: person.id,
        role,
    }))
}

/// Creates the credential, then one person record of the chosen role.
///
/// If the record insert fails after the credential exists, the credential is left behind.
pub async fn register_user(
    store: &dyn DocumentStore,
    auth: &dyn AuthService,
    email: &str,
    password: &str,
    role: Role,
) -> Result<Identity, AppError> {
    auth.sign_up(email, password).await?;

    let person = Person::new(email, role);
    let fields = match role {
        Role::Student => encode(&Student {
            person,
            teachers: vec![],
        }),
        Role::Teacher => encode(&Teacher {
            person,
            students: vec![],
            qset_id: vec![],
        }),
    };

    let inserted = match fields {
        Ok(fields) => store.insert(role.collection(), fields).await,
        Err(e) => Err(e),
    };

    match inserted {
        Ok(id) => {
            tracing::info!("User Created: {role} {id}");
            Ok(Identity { id, role })
        }
        Err(e) => {
            tracing::warn!("Credential for {email} has no {role} record: {e}");
            Err(e)
        }
    }
}
