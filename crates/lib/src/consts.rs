pub const APP_NAME: &str = "shipreport";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SHIPREPORT_CONFIG";

/// Environment variable naming the root for temporary extraction directories.
pub const TEMP_DIR_ENV: &str = "SHIPREPORT_TEMP_DIR";

pub const CONFIG_FILENAME: &str = "config.json";

/// Prefix of every per-run extraction directory.
pub const WORKDIR_PREFIX: &str = "shipreport-";

pub const DEFAULT_PARTITIONS: [&str; 3] = ["core", "master", "web"];
pub const MANIFEST_ENTRY: &str = "addedfiles/_DEV/DeployedItems.xml";
pub const ITEM_PREFIX: &str = "addeditems/";
pub const ITEM_SUFFIX: &str = ".item";
pub const UPDATE_SUFFIX: &str = ".update";
pub const INNER_PACKAGE_ENTRY: &str = "package.zip";
pub const SECURITY_PREFIX: &str = "security/";

/// Root attribute value that allows a package to delete live items.
pub const DELETE_POLICY_VALUE: &str = "Delete";
