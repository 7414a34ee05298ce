use std::fs;

use lynkbridge_config::{persist, BridgeConfig, ConfigStore};

use crate::cmd::{ApplyArgs, ConfigAction, ConfigArgs};
use crate::exit::{config_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_config, OutputFormat};

pub fn run(args: ConfigArgs, format: OutputFormat) -> CliResult<i32> {
    match args.action {
        ConfigAction::Show => {
            let cfg = persist::load(&args.file)
                .map_err(|err| config_error("failed loading configuration", err))?;
            print_config(&cfg, &args.file.display().to_string(), format);
            Ok(SUCCESS)
        }

        ConfigAction::Apply(apply) => {
            let patch = resolve_patch(&apply)?;

            let current = persist::load(&args.file)
                .map_err(|err| config_error("failed loading configuration", err))?;
            let store = ConfigStore::new(current);

            // Merge, validate in full, commit — then persist. A rejected
            // patch leaves the stored file untouched.
            let applied = store
                .apply_json(&patch)
                .map_err(|err| config_error("configuration rejected", err))?;
            persist::save(&applied, &args.file)
                .map_err(|err| config_error("failed saving configuration", err))?;

            print_config(&applied, &args.file.display().to_string(), format);
            Ok(SUCCESS)
        }

        ConfigAction::Reset => {
            let defaults = BridgeConfig::default();
            persist::save(&defaults, &args.file)
                .map_err(|err| config_error("failed saving configuration", err))?;
            print_config(&defaults, &args.file.display().to_string(), format);
            Ok(SUCCESS)
        }
    }
}

fn resolve_patch(args: &ApplyArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.from_file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "provide --json or --from-file"))
}
