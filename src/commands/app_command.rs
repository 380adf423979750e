use std::path::PathBuf;
use std::str::FromStr;

/// 运维控制台命令，仅调用刷新触发与汇总读取接口
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Refresh,
    Show { region: String },
    List,
    Export { path: PathBuf },
    Help,
    Quit,
    Unknown(String),
}

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "refresh" => Ok(AppCommand::Refresh),
            "show" => {
                // 区域名可能带空格，如 "Test Region"
                let region = parts[1..].join(" ");
                if region.is_empty() {
                    Ok(AppCommand::Unknown("用法: show <region>".to_string()))
                } else {
                    Ok(AppCommand::Show { region })
                }
            }
            "list" | "ls" => Ok(AppCommand::List),
            "export" => match parts.get(1) {
                Some(path) if parts.len() == 2 => Ok(AppCommand::Export {
                    path: PathBuf::from(path),
                }),
                _ => Ok(AppCommand::Unknown("用法: export <path.csv>".to_string())),
            },
            "help" | "?" => Ok(AppCommand::Help),
            "quit" | "exit" | "q" => Ok(AppCommand::Quit),
            other => Ok(AppCommand::Unknown(format!("未知命令: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("refresh".parse::<AppCommand>(), Ok(AppCommand::Refresh));
        assert_eq!(
            "show  Test   Region".parse::<AppCommand>(),
            Ok(AppCommand::Show {
                region: "Test Region".to_string()
            })
        );
        assert_eq!("ls".parse::<AppCommand>(), Ok(AppCommand::List));
        assert_eq!("exit".parse::<AppCommand>(), Ok(AppCommand::Quit));
        assert_eq!(
            "export out/summary.csv".parse::<AppCommand>(),
            Ok(AppCommand::Export {
                path: PathBuf::from("out/summary.csv")
            })
        );
        assert!(matches!(
            "export".parse::<AppCommand>(),
            Ok(AppCommand::Unknown(_))
        ));
        assert!(matches!(
            "show".parse::<AppCommand>(),
            Ok(AppCommand::Unknown(_))
        ));
        assert!(matches!(
            "drop tables".parse::<AppCommand>(),
            Ok(AppCommand::Unknown(_))
        ));
    }
}
