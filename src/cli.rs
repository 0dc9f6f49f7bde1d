// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Console commands: a thin presentation layer over the stores.
//!
//! Every command prints JSON on stdout. A failed operation returns an error
//! carrying the store's notice message.

use crate::models::{phone, AdminAccount, NewProduct, Product};
use crate::services::{FilePart, MultipartPayload, Notice, Payload, Transport};
use crate::AppState;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recycle-market")]
#[command(version, about = "ReCycle Market seller and admin console")]
pub struct Cli {
    /// Override the API base URL (default: $RECYCLE_MARKET_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create a seller account (sign in afterwards)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage seller accounts (super-admin)
    Admins {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductAction {
    /// Public listing
    Available {
        /// Only show products whose name or description contains this
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Your own products
    Mine {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Every seller's products (super-admin)
    All {
        #[arg(short, long)]
        search: Option<String>,
        /// Only products of this seller id
        #[arg(long)]
        seller: Option<String>,
    },
    /// List a new product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "1")]
        stock: String,
        /// Product photo
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Edit a product's details or replace its photo
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Set the remaining stock
    Stock { id: String, value: String },
    /// Remove a product
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// List accounts
    List {
        /// Hide super-admin accounts
        #[arg(long)]
        sellers_only: bool,
    },
    /// Delete an account
    Delete { id: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductView<'a> {
    #[serde(flatten)]
    product: &'a Product,
    contact: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountView<'a> {
    #[serde(flatten)]
    account: &'a AdminAccount,
    contact: String,
}

/// Run one command against the stores.
pub async fn run<T: Transport>(command: Command, state: &AppState<T>) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let ok = state.session.login(&email, &password).await;
            check(ok, state.session.last_notice())?;
            print_json(&serde_json::json!({
                "authenticated": state.session.is_authenticated(),
                "superAdmin": state.session.is_super_admin(),
            }))
        }
        Command::Register {
            name,
            email,
            phone,
            location,
            password,
        } => {
            let ok = state
                .session
                .register(&name, &email, &phone, &location, &password)
                .await;
            check(ok, state.session.last_notice())?;
            print_notice(state.session.last_notice())
        }
        Command::Logout => {
            state.session.logout();
            print_json(&serde_json::json!({ "authenticated": false }))
        }
        Command::Whoami => match state.session.identity() {
            Some(identity) => print_json(&serde_json::json!({
                "id": identity.id,
                "name": identity.name,
                "email": identity.email,
                "phone": identity.phone,
                "location": identity.location,
                "isSuperAdmin": identity.is_super_admin,
            })),
            None => anyhow::bail!("Not signed in."),
        },
        Command::Products { action } => run_products(action, state).await,
        Command::Admins { action } => run_admins(action, state).await,
    }
}

async fn run_products<T: Transport>(action: ProductAction, state: &AppState<T>) -> anyhow::Result<()> {
    let catalog = &state.catalog;

    match action {
        ProductAction::Available { search } => {
            let ok = catalog.fetch_available_products().await;
            check_fetch(ok, catalog.error())?;
            print_products(&catalog.search(search.as_deref().unwrap_or_default()))
        }
        ProductAction::Mine { search } => {
            require_session(state)?;
            let ok = catalog.fetch_my_products().await;
            check_fetch(ok, catalog.error())?;
            print_products(&catalog.search(search.as_deref().unwrap_or_default()))
        }
        ProductAction::All { search, seller } => {
            let ok = catalog.fetch_all_products().await;
            if !ok {
                if let Some(err) = catalog.error() {
                    anyhow::bail!(err);
                }
                check(ok, catalog.last_notice())?;
            }
            let products = match seller {
                Some(seller) => catalog.get_products_by_admin(&seller),
                None => catalog.products(),
            };
            let term = search.unwrap_or_default();
            let matching: Vec<Product> = products
                .into_iter()
                .filter(|p| term.trim().is_empty() || p.matches(term.trim()))
                .collect();
            print_products(&matching)
        }
        ProductAction::Add {
            name,
            description,
            price,
            stock,
            image,
        } => {
            require_session(state)?;
            let stock = crate::models::product::parse_stock(&stock)?;
            let image = image
                .map(|path| FilePart::from_path("image", &path))
                .transpose()?;
            let payload = NewProduct {
                name,
                description,
                price,
                stock,
                image,
            }
            .into_payload()?;

            let ok = catalog.add_product(payload).await;
            check(ok, catalog.last_notice())?;
            let added: Vec<Product> = catalog.products().into_iter().take(1).collect();
            print_products(&added)
        }
        ProductAction::Update {
            id,
            name,
            description,
            price,
            image,
        } => {
            require_session(state)?;
            let payload = match image {
                Some(path) => {
                    let mut form = MultipartPayload::new();
                    for (key, value) in [("name", name), ("description", description), ("price", price)] {
                        if let Some(value) = value {
                            form = form.text(key, value);
                        }
                    }
                    Payload::Multipart(form.file(FilePart::from_path("image", &path)?))
                }
                None => {
                    let mut patch = serde_json::Map::new();
                    for (key, value) in [("name", name), ("description", description), ("price", price)] {
                        if let Some(value) = value {
                            patch.insert(key.to_string(), value.into());
                        }
                    }
                    if patch.is_empty() {
                        anyhow::bail!("Nothing to update.");
                    }
                    Payload::Json(serde_json::Value::Object(patch))
                }
            };

            let ok = catalog.update_product(&id, payload).await;
            check(ok, catalog.last_notice())?;
            print_notice(catalog.last_notice())
        }
        ProductAction::Stock { id, value } => {
            require_session(state)?;
            let ok = catalog.update_stock(&id, &value).await;
            check(ok, catalog.last_notice())?;
            print_notice(catalog.last_notice())
        }
        ProductAction::Delete { id } => {
            require_session(state)?;
            let ok = catalog.delete_product(&id).await;
            check(ok, catalog.last_notice())?;
            print_notice(catalog.last_notice())
        }
    }
}

async fn run_admins<T: Transport>(action: AdminAction, state: &AppState<T>) -> anyhow::Result<()> {
    if !state.session.is_super_admin() {
        anyhow::bail!("Permission denied: super-admin access required.");
    }

    match action {
        AdminAction::List { sellers_only } => {
            let accounts = if sellers_only {
                state.session.fetch_sellers().await
            } else {
                state.session.fetch_all_admins().await
            };
            if let Some(notice) = state.session.last_notice().filter(Notice::is_error) {
                anyhow::bail!(notice.message);
            }
            let views: Vec<AccountView<'_>> = accounts
                .iter()
                .map(|account| AccountView {
                    account,
                    contact: phone::international(&account.phone, &state.config.country_code),
                })
                .collect();
            print_json(&views)
        }
        AdminAction::Delete { id } => {
            let ok = state.session.delete_admin_account(&id).await;
            check(ok, state.session.last_notice())?;
            print_notice(state.session.last_notice())
        }
    }
}

fn require_session<T: Transport>(state: &AppState<T>) -> anyhow::Result<()> {
    if !state.session.is_authenticated() {
        anyhow::bail!("Not signed in. Run `recycle-market login` first.");
    }
    Ok(())
}

fn check(ok: bool, notice: Option<Notice>) -> anyhow::Result<()> {
    if ok {
        return Ok(());
    }
    let message = notice
        .map(|n| n.message)
        .unwrap_or_else(|| "Operation failed.".to_string());
    anyhow::bail!(message)
}

fn check_fetch(ok: bool, error: Option<String>) -> anyhow::Result<()> {
    if ok {
        return Ok(());
    }
    anyhow::bail!(error.unwrap_or_else(|| "Failed to load products.".to_string()))
}

fn print_products(products: &[Product]) -> anyhow::Result<()> {
    let views: Vec<ProductView<'_>> = products
        .iter()
        .map(|product| ProductView {
            product,
            contact: phone::digits_only(&product.seller_phone),
        })
        .collect();
    print_json(&views)
}

fn print_notice(notice: Option<Notice>) -> anyhow::Result<()> {
    print_json(&notice)
}

fn print_json<S: Serialize>(value: &S) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
