//! # Shopfront Command Line
//!
//! ```text
//! shopfront [--config FILE] [--customer ID | --staff NAME] <COMMAND>
//!
//!   cart    show | add | remove | qty | clear | load
//!   order   place | status | cancel | approve | list | mine
//!   invoice show | list | cancel | export
//!   stats   [--period month|year|all]
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use shopfront_app::config::AppConfig;
use shopfront_app::error::{ApiError, ApiResult};
use shopfront_app::services::ExportFormat;
use shopfront_app::{init_tracing, App};
use shopfront_client::{InvoiceQuery, OrderQuery};
use shopfront_core::stats::StatsPeriod;
use shopfront_core::{
    Actor, CartLine, CartLineKey, Identity, Money, OrderStatus, PaymentMethod, PaymentStatus,
    RecipientEdit, ShippingInfo,
};

#[derive(Debug, Parser)]
#[command(name = "shopfront", version, about = "Storefront cart and back-office order/invoice tools")]
struct Cli {
    /// Config file (default: platform config dir / shopfront.toml)
    #[arg(long, global = true, env = "SHOPFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Act as this logged-in customer
    #[arg(long, global = true, conflicts_with = "staff")]
    customer: Option<String>,

    /// Act as this staff member
    #[arg(long, global = true)]
    staff: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Storefront cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Order lifecycle
    #[command(subcommand)]
    Order(OrderCommand),
    /// Invoices
    #[command(subcommand)]
    Invoice(InvoiceCommand),
    /// Dashboard statistics
    Stats {
        /// Scope of the outstanding, refunded, method and status figures
        #[arg(long, default_value = "all")]
        period: StatsPeriod,
    },
}

#[derive(Debug, Subcommand)]
enum CartCommand {
    Show,
    Add(AddLine),
    Remove(LineKey),
    /// Change a line's quantity by DELTA (never below 1)
    Qty {
        #[command(flatten)]
        key: LineKey,
        #[arg(long, allow_hyphen_values = true)]
        delta: i64,
    },
    Clear,
    /// Restore the stored cart, adopting the server cart when it is empty
    Load,
}

#[derive(Debug, Args)]
struct LineKey {
    #[arg(long)]
    id: String,
    #[arg(long)]
    color: String,
    #[arg(long)]
    size: String,
}

#[derive(Debug, Args)]
struct AddLine {
    #[command(flatten)]
    key: LineKey,
    #[arg(long)]
    name: String,
    /// Unit price in đồng
    #[arg(long)]
    price: i64,
    #[arg(long, default_value_t = 1)]
    quantity: i64,
    #[arg(long)]
    image: String,
}

#[derive(Debug, Subcommand)]
enum OrderCommand {
    /// Check out the current cart
    Place {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        ward: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        province: String,
        #[arg(long)]
        note: Option<String>,
        /// cod, bank_transfer, cash or vnpay
        #[arg(long, default_value = "cod")]
        payment: PaymentMethod,
    },
    Show {
        order_id: String,
    },
    /// Set a status (pending, approved, shipping, delivered, cancelled or 1-5);
    /// approved runs the approval and derives the invoice
    Status {
        order_id: String,
        status: OrderStatus,
    },
    Cancel {
        order_id: String,
    },
    /// Approve with optional recipient corrections and derive the invoice
    Approve {
        order_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// All orders (staff)
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Orders of the current customer
    Mine,
}

#[derive(Debug, Subcommand)]
enum InvoiceCommand {
    Show {
        invoice_id: String,
    },
    List {
        /// unpaid, paid or refunded
        #[arg(long)]
        payment_status: Option<PaymentStatus>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    Cancel {
        invoice_id: String,
        #[arg(long)]
        reason: String,
    },
    /// Write the invoice as a PDF or spreadsheet
    Export {
        invoice_id: String,
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,
        /// Output file (default: <invoice_id>.<ext>)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> ApiResult<()> {
    let app = App::start(config).await?;
    let session = Session {
        customer: cli.customer,
        staff: cli.staff,
    };

    let result = match cli.command {
        Command::Cart(command) => cart(&app, &session, command).await,
        Command::Order(command) => order(&app, &session, command).await,
        Command::Invoice(command) => invoice(&app, &session, command).await,
        Command::Stats { period } => print(&app.stats.dashboard(period).await?),
    };

    app.db.close().await;
    result
}

struct Session {
    customer: Option<String>,
    staff: Option<String>,
}

impl Session {
    fn identity(&self) -> Identity {
        match &self.customer {
            Some(customer_id) => Identity::Customer {
                customer_id: customer_id.clone(),
            },
            None => Identity::Guest,
        }
    }

    fn actor(&self) -> ApiResult<Actor> {
        match (&self.staff, &self.customer) {
            (Some(name), _) => Ok(Actor::staff(name.clone())),
            (None, Some(customer_id)) => Ok(Actor::customer(customer_id.clone())),
            (None, None) => Err(ApiError::validation("--staff or --customer is required")),
        }
    }

    fn customer_id(&self) -> ApiResult<&str> {
        self.customer
            .as_deref()
            .ok_or_else(|| ApiError::validation("--customer is required"))
    }
}

fn print<T: Serialize>(value: &T) -> ApiResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::internal(format!("Failed to encode output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

async fn cart(app: &App, session: &Session, command: CartCommand) -> ApiResult<()> {
    app.cart.load(&session.identity()).await?;

    match command {
        CartCommand::Show | CartCommand::Load => {}
        CartCommand::Add(line) => {
            let added = app
                .cart
                .add_item(CartLine {
                    product_id: line.key.id,
                    product_name: line.name,
                    unit_price: Money::from_dong(line.price),
                    quantity: line.quantity,
                    color: line.key.color,
                    size: line.key.size,
                    image: line.image,
                })
                .await?;
            if !added {
                return Err(ApiError::cart("Cart line rejected: missing or invalid fields"));
            }
        }
        CartCommand::Remove(key) => {
            app.cart.remove_item(&key.id, &key.size, &key.color).await?;
        }
        CartCommand::Qty { key, delta } => {
            let key = CartLineKey::new(key.id, key.color, key.size);
            app.cart.set_quantity(&key, delta).await?;
        }
        CartCommand::Clear => app.cart.clear().await?,
    }

    #[derive(Serialize)]
    struct CartView {
        items: shopfront_core::Cart,
        totals: shopfront_core::cart::CartTotals,
    }
    print(&CartView {
        items: app.cart.snapshot().await,
        totals: app.cart.totals().await,
    })
}

async fn order(app: &App, session: &Session, command: OrderCommand) -> ApiResult<()> {
    match command {
        OrderCommand::Place {
            name,
            phone,
            street,
            ward,
            district,
            province,
            note,
            payment,
        } => {
            app.cart.load(&session.identity()).await?;
            let shipping = ShippingInfo {
                recipient_name: name,
                phone,
                street,
                ward,
                district,
                province,
                note,
            };
            let placed = app
                .orders
                .place_order(session.customer_id()?, &shipping, payment)
                .await?;
            print(&placed)
        }
        OrderCommand::Show { order_id } => print(&app.orders.order(&order_id).await?),
        OrderCommand::Status { order_id, status } => {
            let (order, invoice) = app
                .set_order_status(&order_id, status, &session.actor()?)
                .await?;
            match invoice {
                Some(invoice) => print(&serde_json::json!({ "order": order, "invoice": invoice })),
                None => print(&order),
            }
        }
        OrderCommand::Cancel { order_id } => {
            print(&app.orders.cancel(&order_id, &session.actor()?).await?)
        }
        OrderCommand::Approve {
            order_id,
            name,
            phone,
            address,
            note,
        } => {
            let edit = RecipientEdit {
                recipient_name: name,
                phone,
                delivery_address: address,
                note,
            };
            let (order, invoice) = app.approve_order(&order_id, &edit, &session.actor()?).await?;
            print(&serde_json::json!({ "order": order, "invoice": invoice }))
        }
        OrderCommand::List {
            status,
            page,
            search,
        } => {
            let query = OrderQuery {
                page,
                status,
                search,
                ..Default::default()
            };
            let page = app.orders.all_orders(&query, &session.actor()?).await?;
            print(&page)
        }
        OrderCommand::Mine => {
            print(&app.orders.orders_for_customer(session.customer_id()?).await?)
        }
    }
}

async fn invoice(app: &App, session: &Session, command: InvoiceCommand) -> ApiResult<()> {
    match command {
        InvoiceCommand::Show { invoice_id } => print(&app.invoices.invoice(&invoice_id).await?),
        InvoiceCommand::List {
            payment_status,
            page,
            search,
        } => {
            let query = InvoiceQuery {
                page,
                payment_status,
                search,
                ..Default::default()
            };
            print(&app.invoices.invoices(&query).await?)
        }
        InvoiceCommand::Cancel { invoice_id, reason } => {
            let invoice = app
                .invoices
                .cancel(&invoice_id, &reason, &session.actor()?)
                .await?;
            print(&invoice)
        }
        InvoiceCommand::Export {
            invoice_id,
            format,
            out,
        } => {
            let invoice = app.invoices.invoice(&invoice_id).await?;
            let bytes = app.invoices.export_snapshot(&invoice, format)?;
            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!("{}.{}", invoice_id, format.extension()))
            });
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|e| ApiError::export(format!("Failed to write {}: {}", path.display(), e)))?;
            info!(path = %path.display(), %format, "Invoice exported");
            print(&serde_json::json!({ "path": path }))
        }
    }
}
