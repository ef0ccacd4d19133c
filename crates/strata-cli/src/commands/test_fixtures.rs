//! On-disk projects for command tests.

use std::path::Path;

use indoc::indoc;

pub const SCHEMA: &str = indoc! {r#"
    interface Node { id: ID! }

    type Artist implements Node {
      id: ID!
      name: String
      bio: String
    }

    type Query {
      artist(id: ID!): Artist
    }
"#};

pub const ARTIST_PAGE: &str = indoc! {r#"
    query ArtistPageQuery($id: ID!) {
      artist(id: $id) { name ...ArtistBio_artist }
    }
"#};

pub const ARTIST_BIO: &str = indoc! {r#"
    import { graphql, createFragmentContainer } from "strata-runtime";

    export default createFragmentContainer(ArtistBio, {
      artist: graphql`
        fragment ArtistBio_artist on Artist { bio }
      `,
    });
"#};

pub fn write(root: &Path, path: &str, text: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

/// Schema, a page query, a tagged fragment module, and a `strata.toml`.
pub fn artist_project(root: &Path, config: &str) {
    write(root, "strata.toml", config);
    write(root, "schema.graphql", SCHEMA);
    write(root, "src/pages/ArtistPage.graphql", ARTIST_PAGE);
    write(root, "src/components/ArtistBio.js", ARTIST_BIO);
    write(root, "src/node_modules/pkg/Broken.graphql", "query {");
    write(root, "src/styles/app.css", "body {}");
}
