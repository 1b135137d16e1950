pub mod config_edit;
pub mod patterns;
pub mod tokenizer;
pub mod validator;

pub use config_edit::{classify_edit_target, ConfigEditTarget};
pub use tokenizer::{needs_shell, tokenize};
pub use validator::{CommandValidator, RiskLevel, ValidationConfig, ValidationError, Verdict};

/// Base commands that are refused outright while `block_dangerous_commands` is on
///
/// Variants spelled `<name>.<suffix>` (`mkfs.ext4`, `fsck.vfat`) are treated as
/// members of the named family.
pub const DANGEROUS_COMMANDS: &[&str] = &[
    // Disk formatting and wiping
    "dd",
    "mkfs",
    "shred",
    "format",
    "wipefs",
    "badblocks",
    "fsck",
    // Partitioning
    "fdisk",
    "cfdisk",
    "parted",
    // Power state
    "init",
    "shutdown",
    "reboot",
    "halt",
    "poweroff",
    // Accounts
    "passwd",
    "userdel",
    "groupdel",
];

/// Base commands that change system state and always ask before running
pub const CONFIRMATION_COMMANDS: &[&str] = &[
    // File operations
    "cp",
    "mv",
    "ln",
    "mkdir",
    "touch",
    "rm",
    "rmdir",
    // Permission changes
    "chmod",
    "chown",
    "chgrp",
    // Archives
    "tar",
    "unzip",
    "gzip",
    "gunzip",
    "zip",
    // Editors
    "nano",
    "vim",
    "vi",
    "emacs",
    "gedit",
    // Package management
    "apt",
    "apt-get",
    "dpkg",
    "snap",
    "pip",
    "pip3",
    // Services and privilege
    "systemctl",
    "service",
    "sudo",
    // Firewall and network configuration
    "iptables",
    "ufw",
    "netplan",
];

/// Interactive editors recognised when detecting config edits
pub const EDITORS: &[&str] = &["nano", "vim", "vi", "emacs", "gedit", "code", "subl"];

/// Extensions that mark an editor argument as a config file
pub const CONFIG_EXTENSIONS: &[&str] = &[".conf", ".config", ".cfg", ".ini", ".yml", ".yaml", ".json"];

/// Path prefixes of configuration files a user may legitimately edit
pub const SAFE_CONFIG_PATHS: &[&str] = &[
    // User shell and editor dotfiles
    "~/.bashrc",
    "~/.bash_aliases",
    "~/.bash_profile",
    "~/.profile",
    "~/.zshrc",
    "~/.zsh_aliases",
    "~/.vimrc",
    "~/.nanorc",
    "~/.gitconfig",
    "~/.ssh/config",
    // Per-user application config
    "~/.config/",
    "~/.local/",
    // Web servers
    "/etc/nginx/",
    "/etc/apache2/",
    "/etc/httpd/",
    // Databases and caches
    "/etc/mysql/",
    "/etc/postgresql/",
    "/etc/redis/",
    "/etc/memcached/",
    // Language runtimes
    "/etc/php/",
    "/etc/python3/",
    // System
    "/etc/environment",
    "/etc/hosts",
    "/etc/fstab",
    "/etc/crontab",
    "/etc/systemd/",
    // Firewall and network
    "/etc/ufw/",
    "/etc/iptables/",
    "/etc/netplan/",
    // Package managers
    "/etc/apt/",
    "/etc/yum.repos.d/",
];

/// Path prefixes whose modification can break the system
pub const CRITICAL_PATHS: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/sudoers",
    "/etc/group",
    "/etc/gshadow",
    "/boot/",
    "/proc/",
    "/sys/",
    "/dev/",
];

/// Roots where any write needs elevated privileges
pub const SYSTEM_PATHS: &[&str] = &["/etc/", "/var/", "/usr/", "/boot/", "/opt/"];
