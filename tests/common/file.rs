use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }

    std::fs::write(&file_spec.path, &file_spec.content).expect("Failed to write file");
}

pub fn write_generated_files(dir: &Path, files_count: usize) -> Vec<FileSpec> {
    use fake::Fake;
    use fake::faker::lorem::en::Words;

    (0..files_count)
        .map(|i| {
            let file_spec = FileSpec::new(
                dir.join(format!("file{i}.txt")),
                format!("{}\n", Words(3..8).fake::<Vec<String>>().join(" ")),
            );
            write_file(file_spec.clone());
            file_spec
        })
        .collect()
}
