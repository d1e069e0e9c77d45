use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use opd_booking::application::account::PatientAccount;
use opd_booking::application::admin::AdminConsole;
use opd_booking::application::coordinator::BookingCoordinator;
use opd_booking::application::session::Session;
use opd_booking::config::{BookingConfig, DEFAULT_OPD_FEE, DEFAULT_UPI_NUMBER};
use opd_booking::domain::appointment::{AppointmentForm, Gender};
use opd_booking::domain::patient::{ANONYMOUS_PRINCIPAL, CallerId, UserRole};
use opd_booking::domain::ports::{ConfirmationStoreRef, RecordGatewayRef};
use opd_booking::error::BookingError;
use opd_booking::infrastructure::in_memory::{InMemoryConfirmationStore, InMemoryRecordGateway};
use opd_booking::infrastructure::json_file::JsonFileConfirmationStore;
use opd_booking::interfaces::console;
use opd_booking::interfaces::csv::record_writer::RecordWriter;
use rust_decimal::Decimal;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "opd_booking=info";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Principal of the logged-in caller, as issued by the identity provider
    #[arg(long, env = "OPD_CALLER", default_value = ANONYMOUS_PRINCIPAL, global = true)]
    caller: CallerId,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "OPD_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Principals granted the admin role (comma separated)
    #[arg(long = "admin", env = "OPD_ADMIN", value_delimiter = ',', global = true)]
    admins: Vec<CallerId>,

    /// File holding the confirmation between payment and the success screen.
    /// Without it the confirmation is kept in memory for this run only.
    #[arg(long, env = "OPD_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    /// OPD consultation fee in rupees
    #[arg(long, env = "OPD_FEE", default_value_t = DEFAULT_OPD_FEE, global = true)]
    opd_fee: Decimal,

    /// UPI number the fee is paid to
    #[arg(long, env = "OPD_UPI_NUMBER", default_value = DEFAULT_UPI_NUMBER, global = true)]
    upi_number: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the doctors accepting OPD appointments
    Doctors,
    /// Register a patient profile for the caller
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Show the caller's profile, role and booked appointments
    Profile,
    /// Fill the OPD form, pay the fee and get a confirmation
    Book(BookArgs),
    /// Export OPD records as CSV (admin only)
    Records {
        /// Only records booked by this patient
        #[arg(long)]
        patient: Option<CallerId>,
    },
    /// Export patient profiles as CSV (admin only)
    Patients,
    /// Assign a role to a user (admin only)
    AssignRole {
        #[arg(long)]
        user: CallerId,
        #[arg(long)]
        role: UserRole,
    },
}

#[derive(Args)]
struct BookArgs {
    #[arg(long, default_value = "")]
    patient_name: String,
    #[arg(long, default_value = "")]
    age: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value_t = Gender::Male)]
    gender: Gender,
    /// Appointment date as YYYY-MM-DD
    #[arg(long, default_value = "")]
    date: String,
    #[arg(long, default_value = "")]
    doctor: String,
    /// Register the caller with this email first if they have no profile yet
    #[arg(long)]
    email: Option<String>,
    /// Acknowledge payment without prompting
    #[arg(long)]
    paid: bool,
}

impl BookArgs {
    fn form(&self) -> AppointmentForm {
        AppointmentForm {
            patient_name: self.patient_name.clone(),
            age: self.age.clone(),
            address: self.address.clone(),
            gender: self.gender,
            appointment_date: self.date.clone(),
            doctor_name: self.doctor.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let config = BookingConfig::new(cli.opd_fee, cli.upi_number.clone(), cli.admins.clone())
        .into_diagnostic()?;
    let gateway = open_gateway(cli.db_path.as_deref(), &config)?;
    let session = Session::new(cli.caller.clone(), gateway);

    match cli.command {
        Command::Doctors => print!("{}", console::render_doctors()),
        Command::Register { name, email } => {
            let profile = PatientAccount::new(session)
                .register(&name, &email)
                .await
                .map_err(report_validation)?;
            println!("Registered {} <{}>", profile.name, profile.email);
        }
        Command::Profile => {
            let account = PatientAccount::new(session);
            let profile = account.profile().await.into_diagnostic()?;
            let role = account.role().await.into_diagnostic()?;
            print!("{}", console::render_profile(profile.as_ref(), role));

            let records = account.own_records().await.into_diagnostic()?;
            if !records.is_empty() {
                RecordWriter::new(io::stdout().lock())
                    .write_records(&records)
                    .into_diagnostic()?;
            }
        }
        Command::Book(args) => {
            let confirmations: ConfirmationStoreRef = match cli.session_file {
                Some(path) => Arc::new(JsonFileConfirmationStore::new(path)),
                None => Arc::new(InMemoryConfirmationStore::new()),
            };
            book(session, &config, confirmations, args).await?;
        }
        Command::Records { patient } => {
            let admin = AdminConsole::new(session);
            let records = match patient {
                Some(patient) => admin.patient_records(&patient).await,
                None => admin.all_records().await,
            }
            .into_diagnostic()?;
            RecordWriter::new(io::stdout().lock())
                .write_records(&records)
                .into_diagnostic()?;
        }
        Command::Patients => {
            let profiles = AdminConsole::new(session)
                .all_patients()
                .await
                .into_diagnostic()?;
            RecordWriter::new(io::stdout().lock())
                .write_profiles(&profiles)
                .into_diagnostic()?;
        }
        Command::AssignRole { user, role } => {
            AdminConsole::new(session)
                .assign_role(&user, role)
                .await
                .into_diagnostic()?;
            println!("Assigned role {} to {}", role, user);
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_gateway(db_path: Option<&Path>, config: &BookingConfig) -> Result<RecordGatewayRef> {
    use opd_booking::infrastructure::rocksdb::RocksDbRecordGateway;

    match db_path {
        Some(path) => {
            let gateway = RocksDbRecordGateway::open(path, config.admins().iter().cloned())
                .into_diagnostic()?;
            Ok(Arc::new(gateway))
        }
        None => Ok(in_memory_gateway(config)),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_gateway(db_path: Option<&Path>, config: &BookingConfig) -> Result<RecordGatewayRef> {
    if db_path.is_some() {
        tracing::warn!(
            "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage"
        );
    }
    Ok(in_memory_gateway(config))
}

fn in_memory_gateway(config: &BookingConfig) -> RecordGatewayRef {
    Arc::new(InMemoryRecordGateway::with_admins(
        config.admins().iter().cloned(),
    ))
}

async fn book(
    session: Session,
    config: &BookingConfig,
    confirmations: ConfirmationStoreRef,
    args: BookArgs,
) -> Result<()> {
    let account = PatientAccount::new(session.clone());
    if let Some(email) = &args.email
        && account.profile().await.into_diagnostic()?.is_none()
    {
        account
            .register(&args.patient_name, email)
            .await
            .map_err(report_validation)?;
    }

    let coordinator =
        BookingCoordinator::new(session, confirmations.clone(), config.payment().clone());
    coordinator
        .submit(&args.form())
        .await
        .map_err(report_validation)?;

    let details = coordinator.payment_details().into_diagnostic()?;
    if let Some(pending) = coordinator.pending_appointment() {
        print!("{}", console::render_payment(&details, &pending));
    }

    if !args.paid && !prompt_payment_done().await.into_diagnostic()? {
        println!("Payment not acknowledged. Your OPD record is saved but no confirmation was issued.");
        return Ok(());
    }

    coordinator.acknowledge_payment().await.into_diagnostic()?;

    // Success screen: reads the stored confirmation exactly once.
    match confirmations.take().await.into_diagnostic()? {
        Some(confirmation) => print!("{}", console::render_confirmation(&confirmation)),
        None => println!("Appointment confirmed, but the confirmation could not be found."),
    }
    Ok(())
}

async fn prompt_payment_done() -> io::Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(b"Type 'done' once the payment is complete: ")
        .await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().eq_ignore_ascii_case("done"))
}

/// Prints field-level validation messages before the error reaches miette.
fn report_validation(error: BookingError) -> miette::Report {
    if let BookingError::Validation(errors) = &error {
        eprint!("{}", console::render_validation_errors(errors));
    }
    miette::miette!("{}", error)
}
