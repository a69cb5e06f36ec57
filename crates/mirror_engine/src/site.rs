/// Fixed client-side viewer shell. The generated document is fetched and
/// rendered in the browser, with a loading indicator during the fetch and an
/// inline error state if it fails.
const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>__TITLE__</title>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.5.1/github-markdown.min.css">
    <style>
        body {
            box-sizing: border-box;
            min-width: 200px;
            max-width: 980px;
            margin: 0 auto;
            padding: 45px;
            background-color: #0d1117;
        }
        .markdown-body {
            background-color: #0d1117;
            color: #c9d1d9;
        }
        .markdown-body img {
            max-width: 100%;
            height: auto;
            border-radius: 6px;
        }
        .header {
            text-align: center;
            margin-bottom: 2em;
            padding: 2em;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            border-radius: 10px;
            color: white;
        }
        .header h1 {
            margin: 0;
            font-size: 2.5em;
            font-weight: 700;
        }
        .loading {
            text-align: center;
            padding: 3em;
            color: #8b949e;
        }
        .spinner {
            border: 3px solid #30363d;
            border-top: 3px solid #58a6ff;
            border-radius: 50%;
            width: 40px;
            height: 40px;
            animation: spin 1s linear infinite;
            margin: 0 auto 1em;
        }
        @keyframes spin {
            0% { transform: rotate(0deg); }
            100% { transform: rotate(360deg); }
        }
        .error {
            background: #da3633;
            color: white;
            padding: 1em;
            border-radius: 6px;
            margin: 2em 0;
        }
    </style>
    <script src="https://cdn.jsdelivr.net/npm/marked/marked.min.js"></script>
</head>
<body>
    <div class="header">
        <h1>__TITLE__</h1>
        <p>Automatically updated</p>
    </div>

    <article class="markdown-body" id="content">
        <div class="loading">
            <div class="spinner"></div>
            <p>Loading...</p>
        </div>
    </article>

    <script>
        fetch('__DOCUMENT__')
            .then(response => {
                if (!response.ok) {
                    throw new Error(`HTTP error! status: ${response.status}`);
                }
                return response.text();
            })
            .then(text => {
                document.getElementById('content').innerHTML = marked.parse(text);
            })
            .catch(err => {
                console.error('Error loading document:', err);
                document.getElementById('content').innerHTML =
                    '<div class="error">' +
                    '<strong>Error loading document</strong><br>' +
                    'Please try refreshing the page or check back later.' +
                    '</div>';
            });
    </script>
</body>
</html>
"##;

/// Render the viewer shell for a given title and document file name.
pub fn index_html(title: &str, document_filename: &str) -> String {
    INDEX_TEMPLATE
        .replace("__TITLE__", title)
        .replace("__DOCUMENT__", document_filename)
}
