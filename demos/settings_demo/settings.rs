//! Settings tree for the demo application: a usenet meta-search front end
//! with a web UI, two downloaders and a handful of indexers.
//!
//! Every category is a plain struct of handles. [`Settings::build`] registers
//! them all in one [`Schema`] and fails on the first definition error.
//!
//! ```text
//! main.*                      host, port, auth, ssl, cache
//! main.logging.*              log file and levels
//! searching.*                 timeouts, query generation, duplicate detection
//! searching.categorysizes.*   min/max sizes per category
//! downloader.*                which downloader and how NZBs reach it
//! downloader.sabnzbd.*        SABnzbd connection
//! downloader.nzbget.*         NZBGet connection
//! indexers.<name>.*           one category per indexer, newznab1..6 share a shape
//! ```

use cfgtree::{
    CfgTreeError, Category, MultiSelectionSetting, Schema, SelectOption, SelectionSetting,
    Setting,
};

fn log_levels() -> Vec<SelectOption> {
    vec![
        SelectOption::new("CRITICAL", "Critical"),
        SelectOption::new("ERROR", "Error"),
        SelectOption::new("WARNING", "Warning"),
        SelectOption::new("INFO", "Info"),
        SelectOption::new("DEBUG", "Debug"),
    ]
}

fn search_ids() -> Vec<SelectOption> {
    vec![
        SelectOption::new("imdbid", "IMDB ID"),
        SelectOption::new("rid", "TvRage ID"),
        SelectOption::new("tvdbid", "TVDB ID"),
    ]
}

pub struct Settings {
    pub schema: Schema,
    pub main: MainSettings,
    pub searching: SearchingSettings,
    pub downloader: DownloaderSettings,
    pub indexers: IndexerList,
}

impl Settings {
    pub fn build() -> Result<Self, CfgTreeError> {
        let mut schema = Schema::new();
        let root = schema.root().clone();
        let main = MainSettings::register(&mut schema, &root)?;
        let searching = SearchingSettings::register(&mut schema, &root)?;
        let downloader = DownloaderSettings::register(&mut schema, &root)?;
        let indexers = IndexerList::register(&mut schema, &root)?;
        Ok(Self {
            schema,
            main,
            searching,
            downloader,
            indexers,
        })
    }
}

// -- main --------------------------------------------------------------------

pub struct MainSettings {
    pub category: Category,
    pub host: Setting<String>,
    pub port: Setting<u16>,
    pub startup_browser: Setting<bool>,
    pub username: Setting<String>,
    pub password: Setting<String>,
    pub apikey: Setting<String>,
    pub enable_auth: Setting<bool>,
    pub ssl: Setting<bool>,
    pub sslcert: Setting<String>,
    pub sslkey: Setting<String>,
    pub debug: Setting<bool>,
    pub cache_enabled: Setting<bool>,
    pub cache_type: SelectionSetting,
    pub cache_timeout: Setting<u32>,
    pub cache_threshold: Setting<u32>,
    pub cache_folder: Setting<String>,
    pub logging: LoggingSettings,
}

impl MainSettings {
    fn register(schema: &mut Schema, root: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(root, "main", "Main")?;
        let cache_types = [
            SelectOption::new("memory", "Cache in the memory during runtime"),
            SelectOption::new("file", "Cache on the file system"),
        ];
        Ok(Self {
            host: schema.setting(
                Setting::new(&c, "host", "0.0.0.0".to_string())
                    .title("Host")
                    .description("Address the web interface binds to."),
            )?,
            port: schema.setting(Setting::new(&c, "port", 5050u16).title("Port"))?,
            startup_browser: schema.setting(
                Setting::new(&c, "startupBrowser", true).title("Open browser on startup"),
            )?,
            username: schema.setting(Setting::new(&c, "username", String::new()))?,
            password: schema.setting(Setting::new(&c, "password", String::new()).password())?,
            apikey: schema.setting(
                Setting::new(&c, "apikey", String::new())
                    .title("API key")
                    .password(),
            )?,
            enable_auth: schema.setting(Setting::new(&c, "enableAuth", false))?,
            ssl: schema.setting(Setting::new(&c, "ssl", false).title("Use SSL"))?,
            sslcert: schema.setting(Setting::new(&c, "sslcert", "nzbhydra.crt".to_string()))?,
            sslkey: schema.setting(Setting::new(&c, "sslkey", "nzbhydra.key".to_string()))?,
            debug: schema.setting(Setting::new(&c, "debug", false))?,
            cache_enabled: schema.setting(Setting::new(&c, "enableCache", true))?,
            cache_type: schema.setting(SelectionSetting::new(
                &c,
                "cacheType",
                &cache_types[0],
                &cache_types,
            ))?,
            cache_timeout: schema.setting(
                Setting::new(&c, "cacheTimeout", 30u32).description("Minutes until a cached result expires."),
            )?,
            cache_threshold: schema.setting(Setting::new(&c, "cachethreshold", 25u32))?,
            cache_folder: schema.setting(Setting::new(&c, "cacheFolder", "cache".to_string()))?,
            logging: LoggingSettings::register(schema, &c)?,
            category: c,
        })
    }
}

pub struct LoggingSettings {
    pub category: Category,
    pub logfile_filename: Setting<String>,
    pub logfile_level: SelectionSetting,
    pub consolelevel: SelectionSetting,
}

impl LoggingSettings {
    fn register(schema: &mut Schema, parent: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(parent, "logging", "Logging")?;
        let levels = log_levels();
        let info = &levels[3];
        Ok(Self {
            logfile_filename: schema.setting(Setting::new(
                &c,
                "logfile-filename",
                "nzbhydra.log".to_string(),
            ))?,
            logfile_level: schema.setting(
                SelectionSetting::new(&c, "logfile-level", info, &levels).title("Log file level"),
            )?,
            consolelevel: schema.setting(
                SelectionSetting::new(&c, "consolelevel", info, &levels).title("Console level"),
            )?,
            category: c,
        })
    }
}

// -- searching ---------------------------------------------------------------

pub struct SearchingSettings {
    pub category: Category,
    pub timeout: Setting<u32>,
    pub ignore_temporarily_disabled: Setting<bool>,
    pub generate_queries: MultiSelectionSetting,
    pub duplicate_size_threshold: Setting<f64>,
    pub duplicate_age_threshold: Setting<u32>,
    pub html_parser: SelectionSetting,
    pub category_sizes: CategorySizes,
}

impl SearchingSettings {
    fn register(schema: &mut Schema, root: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(root, "searching", "Searching")?;
        let query_sources = [
            SelectOption::new("internal", "Internal searches"),
            SelectOption::new("external", "API searches"),
        ];
        let parsers = [
            SelectOption::new("html.parser", "Default BS (slow)"),
            SelectOption::new("lxml", "LXML (faster, needs to be installed separately)"),
        ];
        Ok(Self {
            timeout: schema.setting(
                Setting::new(&c, "timeout", 5u32).description("Seconds to wait for an indexer."),
            )?,
            ignore_temporarily_disabled: schema
                .setting(Setting::new(&c, "ignoreTemporarilyDisabled", false))?,
            generate_queries: schema.setting(
                MultiSelectionSetting::new(&c, "generate_queries", &query_sources[..1], &query_sources)
                    .description("Generate text queries from IDs for these kinds of search."),
            )?,
            duplicate_size_threshold: schema.setting(Setting::new(
                &c,
                "duplicateSizeThresholdInPercent",
                0.1f64,
            ))?,
            duplicate_age_threshold: schema
                .setting(Setting::new(&c, "duplicateAgeThreshold", 3600u32))?,
            html_parser: schema.setting(SelectionSetting::new(
                &c,
                "htmlParser",
                &parsers[0],
                &parsers,
            ))?,
            category_sizes: CategorySizes::register(schema, &c)?,
            category: c,
        })
    }
}

/// Accepted result size in megabytes for one category.
pub struct SizeRange {
    pub min: Setting<u32>,
    pub max: Setting<u32>,
}

impl SizeRange {
    fn register(
        schema: &mut Schema,
        c: &Category,
        prefix: &str,
        min: u32,
        max: u32,
    ) -> Result<Self, CfgTreeError> {
        Ok(Self {
            min: schema.setting(Setting::new(c, format!("{prefix}min"), min))?,
            max: schema.setting(Setting::new(c, format!("{prefix}max"), max))?,
        })
    }
}

pub struct CategorySizes {
    pub category: Category,
    pub enabled: Setting<bool>,
    pub movies: SizeRange,
    pub movies_hd: SizeRange,
    pub movies_sd: SizeRange,
    pub tv: SizeRange,
    pub tv_hd: SizeRange,
    pub tv_sd: SizeRange,
    pub audio: SizeRange,
    pub flac: SizeRange,
    pub mp3: SizeRange,
    pub console: SizeRange,
    pub pc: SizeRange,
    pub xxx: SizeRange,
}

impl CategorySizes {
    fn register(schema: &mut Schema, parent: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(parent, "categorysizes", "Category sizes")?;
        Ok(Self {
            enabled: schema.setting(Setting::new(&c, "enable_category_sizes", true))?,
            movies: SizeRange::register(schema, &c, "movies", 500, 20000)?,
            movies_hd: SizeRange::register(schema, &c, "movieshd", 2000, 20000)?,
            movies_sd: SizeRange::register(schema, &c, "moviessd", 500, 3000)?,
            tv: SizeRange::register(schema, &c, "tv", 50, 5000)?,
            tv_hd: SizeRange::register(schema, &c, "tvhd", 300, 3000)?,
            tv_sd: SizeRange::register(schema, &c, "tvsd", 50, 1000)?,
            audio: SizeRange::register(schema, &c, "audio", 1, 2000)?,
            flac: SizeRange::register(schema, &c, "flac", 10, 2000)?,
            mp3: SizeRange::register(schema, &c, "mp3", 1, 500)?,
            console: SizeRange::register(schema, &c, "console", 100, 40000)?,
            pc: SizeRange::register(schema, &c, "pc", 100, 50000)?,
            xxx: SizeRange::register(schema, &c, "xxx", 100, 10000)?,
            category: c,
        })
    }
}

// -- downloader --------------------------------------------------------------

pub struct DownloaderSettings {
    pub category: Category,
    pub nzb_access_type: SelectionSetting,
    pub nzb_adding_type: SelectionSetting,
    pub downloader: SelectionSetting,
    pub sabnzbd: SabnzbdSettings,
    pub nzbget: NzbgetSettings,
}

impl DownloaderSettings {
    fn register(schema: &mut Schema, root: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(root, "downloader", "Downloader")?;
        let access = [
            SelectOption::new("direct", "Use direct links to the indexer"),
            SelectOption::new("redirect", "Redirect to the indexer"),
            SelectOption::new("serve", "Proxy the NZBs from the indexer"),
        ];
        let adding = [
            SelectOption::new("link", "Send link to NZB"),
            SelectOption::new("nzb", "Upload NZB"),
        ];
        let downloaders = [
            SelectOption::new("nzbget", "NZBGet"),
            SelectOption::new("sabnzbd", "SabNZBd"),
        ];
        Ok(Self {
            nzb_access_type: schema.setting(SelectionSetting::new(
                &c,
                "nzbaccesstype",
                &access[2],
                &access,
            ))?,
            nzb_adding_type: schema.setting(SelectionSetting::new(
                &c,
                "nzbAddingType",
                &adding[1],
                &adding,
            ))?,
            downloader: schema.setting(SelectionSetting::new(
                &c,
                "downloader",
                &downloaders[0],
                &downloaders,
            ))?,
            sabnzbd: SabnzbdSettings::register(schema, &c)?,
            nzbget: NzbgetSettings::register(schema, &c)?,
            category: c,
        })
    }
}

pub struct SabnzbdSettings {
    pub category: Category,
    pub host: Setting<String>,
    pub port: Setting<u16>,
    pub ssl: Setting<bool>,
    pub apikey: Setting<Option<String>>,
    pub username: Setting<Option<String>>,
    pub password: Setting<Option<String>>,
}

impl SabnzbdSettings {
    fn register(schema: &mut Schema, parent: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(parent, "sabnzbd", "SabNZBD")?;
        Ok(Self {
            host: schema.setting(Setting::new(&c, "host", "127.0.0.1".to_string()))?,
            port: schema.setting(Setting::new(&c, "port", 8086u16))?,
            ssl: schema.setting(Setting::new(&c, "ssl", false))?,
            apikey: schema.setting(Setting::new(&c, "apikey", None::<String>).password())?,
            username: schema.setting(Setting::new(&c, "username", None::<String>))?,
            password: schema.setting(Setting::new(&c, "password", None::<String>).password())?,
            category: c,
        })
    }
}

pub struct NzbgetSettings {
    pub category: Category,
    pub host: Setting<String>,
    pub port: Setting<u16>,
    pub ssl: Setting<bool>,
    pub username: Setting<String>,
    pub password: Setting<String>,
}

impl NzbgetSettings {
    fn register(schema: &mut Schema, parent: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(parent, "nzbget", "NZBGet")?;
        Ok(Self {
            host: schema.setting(Setting::new(&c, "host", "127.0.0.1".to_string()))?,
            port: schema.setting(Setting::new(&c, "port", 6789u16))?,
            ssl: schema.setting(Setting::new(&c, "ssl", false))?,
            username: schema.setting(Setting::new(&c, "username", "nzbget".to_string()))?,
            password: schema.setting(
                Setting::new(&c, "password", "tegbzn6789".to_string()).password(),
            )?,
            category: c,
        })
    }
}

// -- indexers ----------------------------------------------------------------

/// Defaults that differ between indexers sharing the common shape.
struct IndexerDefaults<'a> {
    name: Option<&'a str>,
    host: Option<&'a str>,
    enabled: bool,
    search_ids: &'a [SelectOption],
}

/// Settings every indexer has.
pub struct IndexerSettings {
    pub category: Category,
    pub name: Setting<Option<String>>,
    pub host: Setting<Option<String>>,
    pub enabled: Setting<bool>,
    pub search_ids: MultiSelectionSetting,
    pub score: Setting<i64>,
}

impl IndexerSettings {
    fn register(
        schema: &mut Schema,
        parent: &Category,
        name: &str,
        title: &str,
        defaults: IndexerDefaults<'_>,
    ) -> Result<Self, CfgTreeError> {
        let c = schema.category(parent, name, title)?;
        let ids = search_ids();
        Ok(Self {
            name: schema.setting(Setting::new(&c, "name", defaults.name.map(str::to_string)))?,
            host: schema.setting(Setting::new(&c, "host", defaults.host.map(str::to_string)))?,
            enabled: schema.setting(Setting::new(&c, "enabled", defaults.enabled))?,
            search_ids: schema.setting(MultiSelectionSetting::new(
                &c,
                "search_ids",
                defaults.search_ids,
                &ids,
            ))?,
            score: schema.setting(
                Setting::new(&c, "score", 0i64).description("Added to the score of every result."),
            )?,
            category: c,
        })
    }

    fn fixed(
        schema: &mut Schema,
        parent: &Category,
        name: &str,
        title: &str,
        host: &str,
    ) -> Result<Self, CfgTreeError> {
        Self::register(
            schema,
            parent,
            name,
            title,
            IndexerDefaults {
                name: Some(name),
                host: Some(host),
                enabled: true,
                search_ids: &[],
            },
        )
    }
}

pub struct NzbIndexSettings {
    pub indexer: IndexerSettings,
    pub general_min_size: Setting<u32>,
}

/// A user-configured newznab indexer. Disabled until it has been set up.
pub struct NewznabSettings {
    pub indexer: IndexerSettings,
    pub apikey: Setting<Option<String>>,
}

pub struct IndexerList {
    pub category: Category,
    pub binsearch: IndexerSettings,
    pub nzbclub: IndexerSettings,
    pub nzbindex: NzbIndexSettings,
    pub womble: IndexerSettings,
    pub newznab: Vec<NewznabSettings>,
}

pub const NEWZNAB_SLOTS: usize = 6;

impl IndexerList {
    fn register(schema: &mut Schema, root: &Category) -> Result<Self, CfgTreeError> {
        let c = schema.category(root, "indexers", "Indexer")?;
        let binsearch = IndexerSettings::fixed(schema, &c, "binsearch", "Binsearch", "https://binsearch.com")?;
        let nzbclub = IndexerSettings::fixed(schema, &c, "nzbclub", "NZBClub", "http://nzbclub.com")?;
        let nzbindex_common =
            IndexerSettings::fixed(schema, &c, "nzbindex", "NZBIndex", "https://nzbindex.com")?;
        let general_min_size = schema.setting(Setting::new(
            &nzbindex_common.category,
            "generalMinSize",
            1u32,
        ))?;
        let womble = IndexerSettings::fixed(schema, &c, "womble", "Womble", "https://newshost.co.za")?;

        let ids = search_ids();
        let mut newznab = Vec::with_capacity(NEWZNAB_SLOTS);
        for slot in 1..=NEWZNAB_SLOTS {
            let indexer = IndexerSettings::register(
                schema,
                &c,
                &format!("newznab{slot}"),
                &format!("Newznab {slot}"),
                IndexerDefaults {
                    name: None,
                    host: None,
                    enabled: false,
                    search_ids: &ids,
                },
            )?;
            let apikey = schema.setting(
                Setting::new(&indexer.category, "apikey", None::<String>).password(),
            )?;
            newznab.push(NewznabSettings { indexer, apikey });
        }

        Ok(Self {
            binsearch,
            nzbclub,
            nzbindex: NzbIndexSettings {
                indexer: nzbindex_common,
                general_min_size,
            },
            womble,
            newznab,
            category: c,
        })
    }

    /// The newznab indexer with the given 1-based id (`1` or `"1"` for
    /// `indexers.newznab1`). `None` for anything outside `1..=6`.
    pub fn newznab_by_id(&self, id: impl ToString) -> Option<&NewznabSettings> {
        let slot: usize = id.to_string().trim().parse().ok()?;
        self.newznab.get(slot.checked_sub(1)?)
    }

    /// Every indexer's common settings, fixed ones first.
    pub fn all(&self) -> Vec<&IndexerSettings> {
        let mut out = vec![
            &self.binsearch,
            &self.nzbclub,
            &self.nzbindex.indexer,
            &self.womble,
        ];
        out.extend(self.newznab.iter().map(|n| &n.indexer));
        out
    }
}
