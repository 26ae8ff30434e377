use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{RegistryError, RegistryResult},
    identifier::{EntityKind, Identifier},
    persistence::Store,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CustomerPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct CustomerRegistry {
    store: Store<Customer>,
}

impl CustomerRegistry {
    pub fn new(store: Store<Customer>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store<Customer> {
        &self.store
    }

    pub fn create(
        &self,
        id: impl Into<Identifier>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> RegistryResult<()> {
        let id = id.into();
        let mut customers = self.store.load()?;
        if customers.contains_key(&id) {
            warn!(customer_id = %id, "customer ID already exists");
            return Err(RegistryError::duplicate(EntityKind::Customer, &id));
        }

        customers.insert(id.clone(), Customer::new(name, email));
        self.store.save(&customers)?;
        info!(customer_id = %id, "customer created");
        Ok(())
    }

    pub fn delete(&self, id: impl Into<Identifier>) -> RegistryResult<()> {
        let id = id.into();
        let mut customers = self.store.load()?;
        if customers.remove(&id).is_none() {
            return Err(not_found(&id));
        }

        self.store.save(&customers)?;
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    pub fn get(&self, id: impl Into<Identifier>) -> RegistryResult<Customer> {
        let id = id.into();
        let customer = self
            .store
            .load()?
            .remove(&id)
            .ok_or_else(|| not_found(&id))?;

        info!(customer_id = %id, %customer, "customer found");
        Ok(customer)
    }

    pub fn modify(&self, id: impl Into<Identifier>, patch: CustomerPatch) -> RegistryResult<()> {
        let id = id.into();
        let mut customers = self.store.load()?;
        let Some(customer) = customers.get_mut(&id) else {
            return Err(not_found(&id));
        };

        if let Some(name) = patch.name {
            customer.name = name;
        }
        if let Some(email) = patch.email {
            customer.email = email;
        }

        self.store.save(&customers)?;
        info!(customer_id = %id, "customer modified");
        Ok(())
    }
}

fn not_found(id: &Identifier) -> RegistryError {
    warn!(customer_id = %id, "customer not found");
    RegistryError::not_found(EntityKind::Customer, id)
}
