//! Clementine CLI - storefront client from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! clementine products list --keyword mug
//!
//! # Manage the cart
//! clementine cart add <product-id> --qty 2
//! clementine cart show
//!
//! # Sessions
//! clementine account login -e you@example.com -p secret
//! clementine account logout
//!
//! # Place the order
//! clementine checkout shipping --address "1 Main St" --city Springfield \
//!     --postal-code 12345 --country USA --phone 555-0100
//! clementine checkout payment pay-pal
//! clementine checkout submit
//! ```
//!
//! # Commands
//!
//! - `products` - Browse the catalog
//! - `cart` - Inspect and mutate the cart
//! - `account` - Login, registration, logout, profile
//! - `checkout` - Walk the checkout steps and place the order
//! - `orders` - Order history, payment recording, cancellation
//! - `admin` - Back-office management (admin account required)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

use clementine_core::PaymentMethod;

mod commands;

#[derive(Parser)]
#[command(name = "clementine")]
#[command(author, version, about = "Clementine storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect and mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Login, registration, logout, profile
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Walk the checkout steps and place the order
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Back-office management (admin account required)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally filtered
    List {
        /// Keyword to search names and descriptions for
        #[arg(long)]
        keyword: Option<String>,

        /// Category id to filter by
        #[arg(long)]
        category: Option<String>,

        /// Minimum price
        #[arg(long)]
        min_price: Option<String>,

        /// Maximum price
        #[arg(long)]
        max_price: Option<String>,
    },
    /// Show one product
    Show {
        /// Product id
        product_id: String,
    },
    /// List product categories
    Categories,
    /// Review a product
    Review {
        /// Product id
        product_id: String,

        /// Rating, 1 to 5
        #[arg(long)]
        rating: f32,

        /// Review text
        #[arg(long)]
        comment: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product to the cart (or set its quantity)
    Add {
        /// Product id
        product_id: String,

        /// Quantity, clamped to available stock
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        product_id: String,
    },
    /// Show the cart with totals
    Show,
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Log in with email and password
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log out, keeping your cart for next time
    Logout,
    /// Show the current profile
    Profile,
    /// Update the profile
    Update {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New email address
        #[arg(long)]
        email: Option<String>,

        /// New password
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Save the shipping address
    Shipping {
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        postal_code: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        phone: String,
    },
    /// Choose the payment method
    Payment {
        /// Payment method
        method: PaymentMethodArg,
    },
    /// Review totals and place the order
    Submit,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show {
        /// Order id
        order_id: String,
    },
    /// Record a completed payment against an order
    Pay {
        /// Order id
        order_id: String,

        /// Gateway payment id
        #[arg(long)]
        payment_id: String,
    },
    /// Cancel an order
    Cancel {
        /// Order id
        order_id: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a product
    ProductCreate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: u32,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update fields of a product
    ProductUpdate {
        product_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<u32>,
    },
    /// Delete a product
    ProductDelete { product_id: String },
    /// List all orders
    Orders,
    /// Mark an order delivered
    Deliver { order_id: String },
    /// List all users
    Users,
    /// Delete a user
    UserDelete { user_id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PaymentMethodArg {
    PayPal,
    CreditCard,
    Cod,
}

impl From<PaymentMethodArg> for PaymentMethod {
    fn from(arg: PaymentMethodArg) -> Self {
        match arg {
            PaymentMethodArg::PayPal => Self::PayPal,
            PaymentMethodArg::CreditCard => Self::CreditCard,
            PaymentMethodArg::Cod => Self::CashOnDelivery,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                keyword,
                category,
                min_price,
                max_price,
            } => commands::catalog::list(keyword, category, min_price, max_price).await?,
            ProductsAction::Show { product_id } => commands::catalog::show(&product_id).await?,
            ProductsAction::Categories => commands::catalog::categories().await?,
            ProductsAction::Review {
                product_id,
                rating,
                comment,
            } => commands::catalog::review(&product_id, rating, comment).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Add { product_id, qty } => commands::cart::add(&product_id, qty).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&product_id)?,
            CartAction::Show => commands::cart::show()?,
            CartAction::Clear => commands::cart::clear()?,
        },
        Commands::Account { action } => match action {
            AccountAction::Login { email, password } => {
                commands::account::login(&email, &password).await?;
            }
            AccountAction::Register {
                name,
                email,
                password,
            } => commands::account::register(&name, &email, &password).await?,
            AccountAction::Logout => commands::account::logout()?,
            AccountAction::Profile => commands::account::profile().await?,
            AccountAction::Update {
                name,
                email,
                password,
            } => commands::account::update(name, email, password).await?,
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Shipping {
                address,
                city,
                postal_code,
                country,
                phone,
            } => commands::checkout::shipping(address, city, postal_code, country, phone)?,
            CheckoutAction::Payment { method } => commands::checkout::payment(method.into())?,
            CheckoutAction::Submit => commands::checkout::submit().await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list().await?,
            OrdersAction::Show { order_id } => commands::orders::show(&order_id).await?,
            OrdersAction::Pay {
                order_id,
                payment_id,
            } => commands::orders::pay(&order_id, payment_id).await?,
            OrdersAction::Cancel { order_id } => commands::orders::cancel(&order_id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::ProductCreate {
                name,
                price,
                stock,
                image,
                brand,
                category,
                description,
            } => {
                commands::admin::product_create(
                    name,
                    &price,
                    stock,
                    image,
                    brand,
                    category,
                    description,
                )
                .await?;
            }
            AdminAction::ProductUpdate {
                product_id,
                name,
                price,
                stock,
            } => commands::admin::product_update(&product_id, name, price.as_deref(), stock).await?,
            AdminAction::ProductDelete { product_id } => {
                commands::admin::product_delete(&product_id).await?;
            }
            AdminAction::Orders => commands::admin::orders().await?,
            AdminAction::Deliver { order_id } => commands::admin::deliver(&order_id).await?,
            AdminAction::Users => commands::admin::users().await?,
            AdminAction::UserDelete { user_id } => commands::admin::user_delete(&user_id).await?,
        },
    }
    Ok(())
}
