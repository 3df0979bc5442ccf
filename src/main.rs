use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use titanic_survival::model::neural_net::{ActivationFunction, InitMethod};
use titanic_survival::model::optimizer::OptimizerKind;
use titanic_survival::model::weights::write_weights;
use titanic_survival::parsing::{tabular, titanic};
use titanic_survival::{history, logger, training};
use titanic_survival::{PassengerForm, PredictorError, SurvivalPredictor, TrainConfig};

// Exit status for a form with missing mandatory fields
const INCOMPLETE_FORM_EXIT: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log debug output (per-epoch loss, encoded features)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a binary classifier on a CSV dataset
    Train(TrainArgs),
    /// Predict whether a passenger survives
    Predict(PredictArgs),
    /// Show some history of the ship and the film
    History,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DatasetFormat {
    /// Headerless numeric CSV, label in the last column
    Tabular,
    /// Titanic passenger list with a header row
    Titanic,
}

#[derive(clap::Args, Debug)]
struct TrainArgs {
    /// The path of the training dataset
    #[arg(short, long)]
    train_path: String,

    /// Layout of the training file
    #[arg(short, long, value_enum, default_value_t = DatasetFormat::Tabular)]
    format: DatasetFormat,

    /// TOML file with training hyperparams. Flags below override it
    #[arg(short, long)]
    config: Option<String>,

    /// Network structure, e.g. 8 12 8 1
    #[arg(short, long, value_parser, num_args = 2.., value_delimiter = ' ')]
    network_structure: Option<Vec<usize>>,

    /// Learning rate of the network
    #[arg(short, long)]
    learning_rate: Option<f64>,

    /// Batch size of the network
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Number of epochs to train the network for
    #[arg(long)]
    num_epochs: Option<usize>,

    /// Train until the loss settles (see --epsilon) instead of for a fixed number of epochs
    #[arg(long)]
    early_stopping: bool,

    /// Tolerance for early stopping
    #[arg(short, long)]
    epsilon: Option<f64>,

    /// Activation function used by the hidden layers
    #[arg(short, long)]
    activation_function: Option<ActivationFunction>,

    /// Weight initialization method
    #[arg(short, long)]
    initialization: Option<InitMethod>,

    #[arg(short, long)]
    optimizer: Option<OptimizerKind>,

    /// Seed for weight initialization and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Debug mode (save loss in a "epoch     loss" format)
    #[arg(short, long)]
    debug_path: Option<String>,

    /// Where to export the trained model's weights (JSON)
    #[arg(short, long)]
    weight_path: Option<String>,

    /// How many sample predictions to print
    #[arg(long, default_value_t = 5)]
    samples: usize,
}

#[derive(clap::Args, Debug)]
struct PredictArgs {
    /// Model weights written by `train --format titanic`
    #[arg(short, long)]
    model: String,

    /// Passenger class (1, 2 or 3)
    #[arg(long = "class")]
    passenger_class: Option<u8>,

    /// male or female
    #[arg(long)]
    sex: Option<String>,

    #[arg(long, default_value_t = titanic_survival::form::DEFAULT_AGE)]
    age: f64,

    #[arg(long, default_value_t = titanic_survival::form::DEFAULT_FARE)]
    fare: f64,

    /// Port of embarkation (C, Q or S)
    #[arg(long)]
    port: Option<String>,
}

impl TrainArgs {
    /// File config (or defaults) with the command line flags applied on top
    fn to_config(&self) -> anyhow::Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::load_from_file(path)
                .with_context(|| format!("failed to load training config {}", path))?,
            None => TrainConfig::default(),
        };

        if let Some(structure) = &self.network_structure {
            config.network_structure = Some(structure.clone());
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(num_epochs) = self.num_epochs {
            config.num_epochs = num_epochs;
        }
        if self.early_stopping {
            config.early_stopping = true;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(activation_function) = self.activation_function {
            config.activation_function = activation_function;
        }
        if let Some(initialization) = self.initialization {
            config.initialization = initialization;
        }
        if let Some(optimizer) = self.optimizer {
            config.optimizer = optimizer;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run_train(args: TrainArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;
    tracing::debug!("Training config: {:?}", config);

    let dataset = match args.format {
        DatasetFormat::Tabular => tabular::parse_dataset(&args.train_path),
        DatasetFormat::Titanic => titanic::parse_dataset(&args.train_path),
    }
    .with_context(|| format!("failed to read dataset {}", args.train_path))?;

    let threshold = config.threshold;
    let (neural_net, losses) = training::train(&dataset, config)?;

    if let Some(debug_path) = &args.debug_path {
        training::write_losses(debug_path, &losses)
            .with_context(|| format!("failed to write losses to {}", debug_path))?;
    }

    if let Some(weight_path) = &args.weight_path {
        write_weights(weight_path, &neural_net)
            .with_context(|| format!("failed to write weights to {}", weight_path))?;
    }

    let report = training::evaluate(&neural_net, &dataset, threshold, args.samples)?;
    println!("{}", report);

    Ok(())
}

fn run_predict(args: PredictArgs) -> anyhow::Result<()> {
    let predictor = SurvivalPredictor::from_model_file(&args.model)
        .with_context(|| format!("failed to load model {}", args.model))?;

    let form = PassengerForm {
        passenger_class: args.passenger_class,
        sex: args.sex,
        age: args.age,
        fare: args.fare,
        embarked: args.port,
    };

    match predictor.predict_form(&form) {
        Ok(prediction) => {
            println!("{}", prediction);
            Ok(())
        }
        Err(e @ PredictorError::IncompleteForm { .. }) => {
            eprintln!("{}", e);
            std::process::exit(INCOMPLETE_FORM_EXIT);
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    match cli.command {
        Command::Train(args) => run_train(args),
        Command::Predict(args) => run_predict(args),
        Command::History => {
            println!("{}", history::render());
            Ok(())
        }
    }
}
