//! Recurring billing example: store a customer, bill them, then clean up.
//!
//! # Running this example
//!
//! ```bash
//! export DEVPAY_API_KEY=sk_test_...
//! cargo run --example recurring_billing
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use devpay::{Client, ClientConfig, Operation, Params, response::Customer};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("DevPay: Recurring Billing Example\n");

    let client = Client::from_config(&ClientConfig::default())?;

    let created = client
        .create_customer(
            Params::new()
                .set("description", "example customer")
                .set("card", json!({"number": "4242424242424242", "exp_month": 10, "exp_year": 2031})),
        )
        .await?;
    let customer: Customer = created.deserialize()?;
    println!("Created customer {}", customer.id);

    let billed = client
        .bill_customer(Params::new().set("id", customer.id.as_str()).set("amount", 500))
        .await?;
    println!("Billed: {:?}", billed.id());

    // Deletion reports through a completion callback instead of an await.
    let handle = client.spawn_call(
        Operation::DeleteCustomer,
        Params::new().set("id", customer.id.as_str()),
        |outcome| match outcome {
            Ok(response) => println!("Deleted: {:?}", response.get_bool("deleted")),
            Err(err) => eprintln!("Delete failed: {err}"),
        },
    );
    handle.await?;

    Ok(())
}
