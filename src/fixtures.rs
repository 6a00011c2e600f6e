#[cfg(test)]
pub mod test {
    use crate::category::Category;
    use crate::schema::Schema;
    use crate::setting::{MultiSelectionSetting, SelectionSetting, Setting};
    use crate::types::SelectOption;

    pub fn log_levels() -> Vec<SelectOption> {
        vec![
            SelectOption::new("CRITICAL", "Critical"),
            SelectOption::new("ERROR", "Error"),
            SelectOption::new("WARNING", "Warning"),
            SelectOption::new("INFO", "Info"),
            SelectOption::new("DEBUG", "Debug"),
        ]
    }

    pub fn search_id_options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("imdbid", "IMDB ID"),
            SelectOption::new("rid", "TvRage ID"),
            SelectOption::new("tvdbid", "TVDB ID"),
        ]
    }

    /// A small schema shaped like a real application's settings:
    ///
    /// ```text
    /// main.host, main.port, main.debug
    /// main.logging.logfile-filename, main.logging.consolelevel (select)
    /// searching.timeout, searching.duplicateSizeThresholdInPercent
    /// indexers.newznab1.apikey (nullable), indexers.newznab1.search_ids (ordered)
    /// ```
    pub struct TestSchema {
        pub schema: Schema,
        pub main: Category,
        pub logging: Category,
        pub searching: Category,
        pub newznab1: Category,
        pub host: Setting<String>,
        pub port: Setting<u16>,
        pub debug: Setting<bool>,
        pub logfile: Setting<String>,
        pub console_level: SelectionSetting,
        pub timeout: Setting<i64>,
        pub threshold: Setting<f64>,
        pub apikey: Setting<Option<String>>,
        pub search_ids: MultiSelectionSetting,
    }

    impl TestSchema {
        pub fn build() -> Self {
            let mut schema = Schema::new();
            let root = schema.root().clone();
            let levels = log_levels();
            let ids = search_id_options();

            let main = schema.category(&root, "main", "Main").unwrap();
            let host = schema
                .setting(Setting::new(&main, "host", "0.0.0.0".to_string()).title("Host"))
                .unwrap();
            let port = schema
                .setting(
                    Setting::new(&main, "port", 5050u16)
                        .title("Port")
                        .description("Port the web interface listens on."),
                )
                .unwrap();
            let debug = schema.setting(Setting::new(&main, "debug", false)).unwrap();

            let logging = schema.category(&main, "logging", "Logging").unwrap();
            let logfile = schema
                .setting(Setting::new(
                    &logging,
                    "logfile-filename",
                    "app.log".to_string(),
                ))
                .unwrap();
            let console_level = schema
                .setting(SelectionSetting::new(
                    &logging,
                    "consolelevel",
                    &levels[3],
                    &levels,
                ))
                .unwrap();

            let searching = schema.category(&root, "searching", "Searching").unwrap();
            let timeout = schema
                .setting(Setting::new(&searching, "timeout", 5i64))
                .unwrap();
            let threshold = schema
                .setting(Setting::new(
                    &searching,
                    "duplicateSizeThresholdInPercent",
                    0.1f64,
                ))
                .unwrap();

            let indexers = schema.category(&root, "indexers", "Indexers").unwrap();
            let newznab1 = schema.category(&indexers, "newznab1", "Newznab 1").unwrap();
            let apikey = schema
                .setting(Setting::new(&newznab1, "apikey", None::<String>))
                .unwrap();
            let search_ids = schema
                .setting(MultiSelectionSetting::ordered(
                    &newznab1,
                    "search_ids",
                    &ids,
                    &ids,
                ))
                .unwrap();

            Self {
                schema,
                main,
                logging,
                searching,
                newznab1,
                host,
                port,
                debug,
                logfile,
                console_level,
                timeout,
                threshold,
                apikey,
                search_ids,
            }
        }
    }

    #[test]
    fn test_schema_builds() {
        let t = TestSchema::build();
        assert_eq!(t.schema.settings().len(), 9);
        assert_eq!(t.logging.path(), "main.logging.");
        assert_eq!(t.searching.path(), "searching.");
        assert_eq!(t.newznab1.path(), "indexers.newznab1.");
    }
}
