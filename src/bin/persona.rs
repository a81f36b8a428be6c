//! Persona CLI - Command-line interface for Synheart Persona
//!
//! Commands:
//! - replay: Replay recorded interaction events and evaluate them (batch mode)
//! - evaluate: Evaluate a behavioral profile JSON
//! - validate: Validate recorded event schema
//! - schema: Print schema information
//! - doctor: Diagnose configuration health

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use synheart_persona::evaluator::RuleEvaluator;
use synheart_persona::ml::{RemoteScorer, RemoteScorerConfig};
use synheart_persona::replay::{self, InteractionEvent, SessionReplayer, EVENT_SCHEMA_VERSION};
use synheart_persona::types::BehavioralProfile;
use synheart_persona::{PERSONA_VERSION, PRODUCER_NAME};

/// Persona - On-device engine for interaction-style trait inference
#[derive(Parser)]
#[command(name = "persona")]
#[command(author = "Synheart AI Inc")]
#[command(version = PERSONA_VERSION)]
#[command(about = "Infer interaction-style trait weights from session telemetry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded interaction events and evaluate them (batch mode)
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Session count backing the evaluation
        #[arg(long, default_value = "1")]
        session_count: u64,

        /// Emit the behavioral profile instead of the evaluation result
        #[arg(long)]
        profile_only: bool,
    },

    /// Evaluate a behavioral profile JSON
    Evaluate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Session count backing the evaluation
        #[arg(long, default_value = "1")]
        session_count: u64,
    },

    /// Validate recorded event schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose configuration health
    Doctor {
        /// Check a scoring endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (persona.interaction_event.v1)
    Input,
    /// Output schema (evaluation result)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PersonaCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            input_format,
            output_format,
            session_count,
            profile_only,
        } => cmd_replay(
            &input,
            &output,
            input_format,
            output_format,
            session_count,
            profile_only,
        ),

        Commands::Evaluate {
            input,
            output,
            output_format,
            session_count,
        } => cmd_evaluate(&input, &output, output_format, session_count),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { endpoint, json } => cmd_doctor(endpoint.as_deref(), json),
    }
}

fn read_input(input: &PathBuf) -> Result<String, PersonaCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &PathBuf, data: &str) -> Result<(), PersonaCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data);
        Ok(())
    } else {
        fs::write(output, data)?;
        Ok(())
    }
}

fn parse_events(data: &str, format: InputFormat) -> Result<Vec<InteractionEvent>, PersonaCliError> {
    let events = match format {
        InputFormat::Ndjson => replay::parse_ndjson(data)?,
        InputFormat::Json => replay::parse_array(data)?,
    };
    Ok(events)
}

fn format_json<T: serde::Serialize>(
    value: &T,
    format: &OutputFormat,
) -> Result<String, PersonaCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

fn cmd_replay(
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
    session_count: u64,
    profile_only: bool,
) -> Result<(), PersonaCliError> {
    let data = read_input(input)?;
    let events = parse_events(&data, input_format)?;

    if events.is_empty() {
        return Err(PersonaCliError::NoEvents);
    }

    let profile = SessionReplayer::new().replay(&events);

    let rendered = if profile_only {
        format_json(&profile, &output_format)?
    } else {
        let result = RuleEvaluator::evaluate_behavior(&profile, session_count);
        format_json(&result, &output_format)?
    };

    write_output(output, &rendered)
}

fn cmd_evaluate(
    input: &PathBuf,
    output: &PathBuf,
    output_format: OutputFormat,
    session_count: u64,
) -> Result<(), PersonaCliError> {
    let data = read_input(input)?;
    let profile: BehavioralProfile = serde_json::from_str(&data)?;

    let result = RuleEvaluator::evaluate_behavior(&profile, session_count);
    let rendered = format_json(&result, &output_format)?;

    write_output(output, &rendered)
}

fn cmd_validate(
    input: &PathBuf,
    input_format: InputFormat,
    json: bool,
) -> Result<(), PersonaCliError> {
    let data = read_input(input)?;

    let mut total = 0usize;
    let mut errors: Vec<ValidationErrorDetail> = Vec::new();

    match input_format {
        InputFormat::Ndjson => {
            for (line_num, line) in data.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                total += 1;
                if let Err(e) = serde_json::from_str::<InteractionEvent>(trimmed) {
                    errors.push(ValidationErrorDetail {
                        line: line_num + 1,
                        error: e.to_string(),
                    });
                }
            }
        }
        InputFormat::Json => match replay::parse_array(&data) {
            Ok(events) => total = events.len(),
            Err(e) => {
                total = 1;
                errors.push(ValidationErrorDetail {
                    line: 1,
                    error: e.to_string(),
                });
            }
        },
    }

    let report = ValidationReport {
        schema: EVENT_SCHEMA_VERSION.to_string(),
        total_events: total,
        valid_events: total - errors.len(),
        invalid_events: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Schema:         {}", report.schema);
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Line {}: {}", err.line, err.error);
            }
        }
    }

    if report.invalid_events > 0 {
        Err(PersonaCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), PersonaCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", EVENT_SCHEMA_VERSION);
                println!();
                println!("Recorded interaction events, one JSON object per line (ndjson)");
                println!("or a JSON array. Every event carries t_ms, the host's monotonic");
                println!("timestamp in milliseconds, plus an event_type tag:");
                println!();
                println!("1. movement - Pointer sample: {{ t_ms, x, y }}");
                println!("2. click - Click: {{ t_ms }}");
                println!("3. step_start - A decision point became visible: {{ t_ms }}");
                println!("4. step_complete - The decision step finished: {{ t_ms }}");
                println!("5. revision - A choice was undone or changed: {{ t_ms }}");
                println!("6. choice - Contextual key/value choice: {{ t_ms, key, value }}");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: evaluation result");
                println!();
                println!("The evaluation result contains:");
                println!();
                println!("- weights: {{ logic, intuition, fluidity, complexity }} each in [0, 1]");
                println!("- confidence: [0, 1], capped at 0.95");
                println!("- session_count: sessions backing the evaluation");
                println!("- reasoning: deterministic summary of the input features");
                println!("- computed_at_utc: RFC3339 timestamp");
            }
        }
    }

    Ok(())
}

fn cmd_doctor(endpoint: Option<&str>, json: bool) -> Result<(), PersonaCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "persona_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Persona version {}", PERSONA_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", EVENT_SCHEMA_VERSION),
    });

    match endpoint {
        Some(url) => match RemoteScorer::new(RemoteScorerConfig::new(url)) {
            Ok(_) => checks.push(DoctorCheck {
                name: "endpoint".to_string(),
                status: CheckStatus::Ok,
                message: format!("Endpoint URL is valid: {}", url),
            }),
            Err(e) => checks.push(DoctorCheck {
                name: "endpoint".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            }),
        },
        None => checks.push(DoctorCheck {
            name: "endpoint".to_string(),
            status: CheckStatus::Warning,
            message: "No scoring endpoint configured (rule path only)".to_string(),
        }),
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PERSONA_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Persona Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PersonaCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/persona.interaction_event.v1.json",
        "title": "persona.interaction_event.v1",
        "description": "Synheart Persona recorded interaction event schema",
        "type": "object",
        "required": ["event_type", "t_ms"],
        "properties": {
            "event_type": {
                "type": "string",
                "enum": ["movement", "click", "step_start", "step_complete", "revision", "choice"]
            },
            "t_ms": { "type": "number" },
            "x": { "type": "number" },
            "y": { "type": "number" },
            "key": { "type": "string" },
            "value": { "type": "string" }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/persona.evaluation_result.v1.json",
        "title": "persona.evaluation_result.v1",
        "description": "Synheart Persona evaluation result schema",
        "type": "object",
        "required": ["weights", "confidence", "session_count", "reasoning", "computed_at_utc"],
        "properties": {
            "weights": {
                "type": "object",
                "required": ["logic", "intuition", "fluidity", "complexity"],
                "properties": {
                    "logic": { "type": "number", "minimum": 0, "maximum": 1 },
                    "intuition": { "type": "number", "minimum": 0, "maximum": 1 },
                    "fluidity": { "type": "number", "minimum": 0, "maximum": 1 },
                    "complexity": { "type": "number", "minimum": 0, "maximum": 1 }
                }
            },
            "confidence": { "type": "number", "minimum": 0, "maximum": 0.95 },
            "session_count": { "type": "integer" },
            "reasoning": { "type": "string" },
            "computed_at_utc": { "type": "string", "format": "date-time" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum PersonaCliError {
    Io(io::Error),
    Compute(synheart_persona::ComputeError),
    Json(serde_json::Error),
    NoEvents,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PersonaCliError {
    fn from(e: io::Error) -> Self {
        PersonaCliError::Io(e)
    }
}

impl From<synheart_persona::ComputeError> for PersonaCliError {
    fn from(e: synheart_persona::ComputeError) -> Self {
        PersonaCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PersonaCliError {
    fn from(e: serde_json::Error) -> Self {
        PersonaCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PersonaCliError> for CliError {
    fn from(e: PersonaCliError) -> Self {
        match e {
            PersonaCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PersonaCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {}", EVENT_SCHEMA_VERSION)),
            },
            PersonaCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PersonaCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            PersonaCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            PersonaCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema: String,
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    line: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
