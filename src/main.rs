use clap::{Arg, ArgAction, Command};
use label_i18n::{MergeMode, Settings, Translator, load_manifest};
use serde_json::Value;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("label-i18n")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate a label using literal, file and remote translation sources")
        .arg(
            Arg::new("label")
                .help("Label to translate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("params")
                .help("Positional parameters substituted into {0}, {1}, ...")
                .index(2)
                .num_args(1..),
        )
        .arg(
            Arg::new("language")
                .long("language")
                .short('l')
                .help("Language to translate into; also the language of --file and --url"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .help("JSON translation file (repeatable)")
                .requires("language")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .short('u')
                .help("Remote translation URL, fetched with ?language=<language> (repeatable)")
                .requires("language")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("dir")
                .long("dir")
                .short('d')
                .help("Directory of <language>.json translation files"),
        )
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .short('m')
                .help("JSON manifest listing language and translation sources"),
        )
        .arg(
            Arg::new("extend")
                .long("extend")
                .short('e')
                .help("Extend existing documents instead of replacing them (--file, --url, --dir)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json-params")
                .long("json-params")
                .help("Parameters as a JSON array, e.g. '[\"World\", 3]'")
                .conflicts_with("params"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show every configuration step")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let label = matches
        .get_one::<String>("label")
        .ok_or("missing label")?;
    let verbose = matches.get_flag("verbose");
    let mode = MergeMode::from_extend(matches.get_flag("extend"));

    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut builder = Translator::builder().settings(Settings::from_env());
    if verbose {
        builder = builder.observer(|event| eprintln!("   {}", event));
    }
    let translator = builder.build()?;

    // 1. Register sources; explicit flags come after the manifest so they win
    if let Some(manifest) = matches.get_one::<String>("manifest") {
        translator.apply_manifest(&load_manifest(Path::new(manifest))?);
    }
    if let Some(dir) = matches.get_one::<String>("dir") {
        translator.translation_dir(dir, mode);
    }
    if let Some(language) = matches.get_one::<String>("language") {
        for file in matches.get_many::<String>("file").into_iter().flatten() {
            translator.translation_file(language, file, mode);
        }
        for url in matches.get_many::<String>("url").into_iter().flatten() {
            translator.translation_url(language, url, mode);
        }
        translator.language(language);
    }

    if verbose {
        println!("📦 {} pending request(s)", translator.pending_requests());
    }

    // 2. Configure; failed sources are reported but the lookup still runs
    if let Err(e) = translator.configure().await {
        eprintln!("⚠️  {}", e);
    }

    if verbose {
        println!(
            "🌍 Current language: {}",
            translator.current_language().as_deref().unwrap_or("<none>")
        );
        println!("   Languages: {:?}", translator.languages());
        println!();
    }

    // 3. Translate
    let result = match matches.get_one::<String>("json-params") {
        Some(raw) => {
            let parameters: Value = serde_json::from_str(raw)?;
            translator.translate_value(label, Some(&parameters)).await
        }
        None => {
            let parameters: Vec<&String> = matches
                .get_many::<String>("params")
                .into_iter()
                .flatten()
                .collect();
            translator.translate_with(label, &parameters).await
        }
    };

    match result {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            Err(e.into())
        }
    }
}
