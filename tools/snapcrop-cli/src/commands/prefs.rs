//! Show or reset preferences.

use snapcrop_common::config::PreferencesStore;

pub fn run(
    store: &dyn PreferencesStore,
    show: bool,
    reset_remembered: bool,
    reset_all: bool,
) -> anyhow::Result<()> {
    if reset_all {
        store.reset_to_defaults()?;
        println!("Preferences restored to defaults");
    } else if reset_remembered {
        store.reset_remembered_action()?;
        println!("Remembered action cleared");
    }

    if show || !(reset_all || reset_remembered) {
        let prefs = store.snapshot();
        println!("{}", serde_json::to_string_pretty(&prefs)?);
    }
    Ok(())
}
